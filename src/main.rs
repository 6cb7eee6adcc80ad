fn main() {
    if let Err(err) = recorrida::cli::run() {
        recorrida::ui::eprintln_error(&err);
        std::process::exit(recorrida::exit::exit_code(&err));
    }
}
