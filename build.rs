use std::env;

const TARGET_OVERRIDE_ENV: &str = "TARGET_OVERRIDE";

fn main() {
    println!("cargo:rerun-if-env-changed={TARGET_OVERRIDE_ENV}");

    let target = env::var(TARGET_OVERRIDE_ENV)
        .or_else(|_| env::var("TARGET"))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={target}");
}
