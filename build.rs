fn main() {
    // Build-time secrets baked into the device binary.
    for var in ["DOORMODE_API_KEY", "DOORMODE_WIFI_SSID", "DOORMODE_WIFI_PASS"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
