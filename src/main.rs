fn main() {
    fpl_knockout_lib::run()
}
