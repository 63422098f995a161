use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let convert = clap::Command::new("convert")
        .about("Convert a page to its machine view")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--selector <SELECTOR> "CSS selector of the main content").value_name("SELECTOR"))
        .arg(
            clap::Arg::new("no_selector")
                .long("no-selector")
                .action(clap::ArgAction::SetTrue)
                .help("Convert the whole page instead of the main content"),
        )
        .arg(
            clap::Arg::new("max_html_length")
                .long("max-html-length")
                .value_name("BYTES")
                .help("Truncate HTML above this many bytes, 0 for unlimited"),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(
            clap::Arg::new("user_agent")
                .long("user-agent")
                .value_name("UA")
                .help("Custom User-Agent for HTTP requests"),
        );

    let generate = clap::Command::new("generate").about("Print the llms.txt discovery document").arg(
        clap::arg!(-o --output <FILE> "Output file (default: stdout)")
            .value_name("FILE")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    );

    let mut cmd = clap::Command::new("llms-txt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Machine-readable Markdown views of web pages and llms.txt discovery documents")
        .arg(
            clap::arg!(-c --config <FILE> "Configuration file")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(convert)
        .subcommand(generate);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "llms-txt", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "llms-txt", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "llms-txt", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "llms-txt", &completions_dir).unwrap();

    println!("cargo:rustc-env=LLMS_TXT_COMPLETIONS_DIR={}", completions_dir.display());
    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
