fn main() {
    crossconvert::projects::cli::start_cli();
}
