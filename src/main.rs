fn main() {
    std::process::exit(wfdash::run());
}
