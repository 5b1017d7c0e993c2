fn main() {
    starwake::game::run();
}
