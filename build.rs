fn main() {
    // Forward ESP-IDF link args and cfgs only when cross-compiling for the
    // chip; host builds (tests, simulation) skip the sysenv entirely.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
