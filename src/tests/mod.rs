#[cfg(feature = "log")]
use log::LevelFilter;


fn init_logger() {
    #[cfg(feature = "log")]
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Error)
        .filter(Some("sst25v_nor_flash_rs"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
