//! Adds the engine library directory to the link search path when the
//! `native` feature is enabled.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=TB_CLIENT_LIB_DIR");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    if let Ok(dir) = env::var("TB_CLIENT_LIB_DIR") {
        println!("cargo:rustc-link-search=native={dir}");
    }
}
