fn main() {
    // Compile lalrpop grammar files (src/**/*.lalrpop -> OUT_DIR)
    lalrpop::process_root().unwrap();
}
