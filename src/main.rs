fn main() {
    if let Err(e) = judgebox::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
