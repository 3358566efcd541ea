fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/workforce_scheduler.proto");

    // protoc is only needed when the gRPC surface is compiled in
    if std::env::var_os("CARGO_FEATURE_SERVER").is_some() {
        tonic_build::compile_protos("proto/workforce_scheduler.proto")?;
    }

    Ok(())
}
