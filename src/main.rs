fn main() {
    if let Err(err) = telemetry_lens::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
