//! Linker setup for the RP2040 image, and the TinyUSB host library when the
//! `usb-host` feature is enabled.

use std::env;
use std::path::PathBuf;

fn main() {
    // cortex-m-rt's link.x includes memory.x from the search path
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    std::fs::copy("memory.x", out_dir.join("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());

    if env::var("TARGET").unwrap().starts_with("thumbv6m") {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    if env::var_os("CARGO_FEATURE_USB_HOST").is_some() {
        // Host-mode TinyUSB built for the RP2040 port, with pico-sdk's
        // irq_set_exclusive_handler / irq_add_shared_handler /
        // irq_set_enabled stubbed out (the Rust vector table owns USBCTRL_IRQ)
        let lib_dir = env::var("TINYUSB_LIB_DIR")
            .expect("usb-host needs TINYUSB_LIB_DIR pointing at a directory containing libtinyusb.a");
        println!("cargo:rustc-link-search=native={lib_dir}");
        println!("cargo:rustc-link-lib=static=tinyusb");
        println!("cargo:rerun-if-env-changed=TINYUSB_LIB_DIR");
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=memory.x");
}
