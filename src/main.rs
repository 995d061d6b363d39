fn main() {
    if let Err(err) = climate_query::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
