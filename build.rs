fn main() {
    // The library and its tests build without the webview toolchain.
    #[cfg(feature = "desktop")]
    {
        println!("cargo:rerun-if-changed=tauri.conf.json");
        tauri_build::build();
    }
}
