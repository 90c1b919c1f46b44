fn main() {
    // ESP-IDF environment is only needed for the on-target build; the host
    // simulation and tests link against std alone.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
