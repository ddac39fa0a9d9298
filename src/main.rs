fn main() {
    if let Err(e) = pagoda_garden::run(pagoda_garden::Config::default()) {
        log::error!("{e:#}");
        eprintln!("pagoda-garden: {e:#}");
        std::process::exit(1);
    }
}
