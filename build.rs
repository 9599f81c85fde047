//! Fetches the English tokenizer binary into `OUT_DIR` so the pipeline can
//! embed it with `nlprule::tokenizer!("en")`.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    nlprule_build::BinaryBuilder::new(
        &["en"],
        std::env::var("OUT_DIR").expect("OUT_DIR is set when build.rs is running"),
    )
    .build()
    .expect("failed to build nlprule binaries")
    .validate()
    .expect("failed to validate nlprule binaries");
}
