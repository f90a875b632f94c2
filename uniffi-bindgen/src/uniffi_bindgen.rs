//! Generates foreign-language bindings for `prepkit_core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
