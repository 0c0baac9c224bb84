fn main() {
    if let Err(err) = osmlabel::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
