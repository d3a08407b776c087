fn main() {
    sassy_mixins::cli::run();
}
