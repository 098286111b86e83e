fn main() {
    coolast::cli::run();
}
