// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    crewbot_test_support::logging::init();
}
