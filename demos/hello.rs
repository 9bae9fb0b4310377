use pennant::Registry;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let mut flags = Registry::new("hello", "Greets people.");
    let help = flags.flag_bool("help", false, "Print this message", None).unwrap();
    let emoji = flags.flag_bool("emoji", false, "Use an emoji instead of `!`", None).unwrap();
    let times = flags.flag_u64("n", 1, "How many times to greet", None).unwrap();
    let shout = flags.declare_subcommand("shout", "Greet loudly").unwrap();
    let shout_name = flags.flag_str("name", "world", "Who to greet", Some("shout")).unwrap();

    if let Err(err) = flags.parse_env() {
        eprintln!("{err}\n");
        flags.write_help(std::io::stderr()).unwrap();
        std::process::exit(1)
    }
    if *flags.value(help) {
        print!("{}", flags.help());
        return;
    }

    let bang = if *flags.value(emoji) { "❣️" } else { "!" };
    for _ in 0..*flags.value(times) {
        if flags.is_active(shout) {
            println!("HELLO {}{}", flags.value(shout_name).to_uppercase(), bang);
        } else {
            println!("Hello world{}", bang);
        }
    }
}
