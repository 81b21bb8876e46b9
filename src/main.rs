use anyhow::Result;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::io::Write;
use std::path::Path;

use stanza::build::build_site;
use stanza::compose::{compose, Compose};
use stanza::config::Config;
use stanza::init::{init_blog, Options};
use stanza::store::Store;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format(|buf, record| writeln!(buf, "{}", record.args()))
    .init();

    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let blog_arg = Arg::with_name("blog")
        .help("Path to the blog directory.")
        .required(true);

    let matches = App::new("stanza")
        .about("A small and easy static blog generator")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("init")
                .about("Initialize a new blog")
                .arg(
                    Arg::with_name("path")
                        .help("Directory to create the blog in.")
                        .required(true),
                )
                .arg(
                    Arg::with_name("title")
                        .long("title")
                        .takes_value(true)
                        .required(true)
                        .help("Blog title."),
                )
                .arg(
                    Arg::with_name("url")
                        .long("url")
                        .takes_value(true)
                        .required(true)
                        .help("Blog URL."),
                )
                .arg(
                    Arg::with_name("name")
                        .long("name")
                        .takes_value(true)
                        .help("Your name."),
                )
                .arg(
                    Arg::with_name("email")
                        .long("email")
                        .takes_value(true)
                        .help("Your email."),
                ),
        )
        .subcommand(
            SubCommand::with_name("compose")
                .about("Compose a new post")
                .arg(blog_arg.clone())
                .arg(
                    Arg::with_name("title")
                        .long("title")
                        .takes_value(true)
                        .required(true)
                        .help("Post title."),
                )
                .arg(
                    Arg::with_name("key")
                        .long("key")
                        .takes_value(true)
                        .help("Post key. Example: my-first-post."),
                )
                .arg(
                    Arg::with_name("tag")
                        .long("tag")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Post tag."),
                )
                .arg(
                    Arg::with_name("editor")
                        .long("editor")
                        .takes_value(true)
                        .help("Editor command. Defaults to $EDITOR."),
                ),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Build the blog")
                .arg(blog_arg)
                .arg(
                    Arg::with_name("output")
                        .help("Output directory.")
                        .required(true),
                ),
        )
        .subcommand(SubCommand::with_name("version").about("Print version"))
        .get_matches();

    match matches.subcommand() {
        ("init", Some(matches)) => init_cmd(matches),
        ("compose", Some(matches)) => compose_cmd(matches),
        ("build", Some(matches)) => build_cmd(matches),
        ("version", Some(_)) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn init_cmd(matches: &ArgMatches) -> Result<()> {
    init_blog(
        Path::new(matches.value_of("path").unwrap()),
        &Options {
            title: matches.value_of("title").unwrap(),
            url: matches.value_of("url").unwrap(),
            author_name: matches.value_of("name"),
            author_email: matches.value_of("email"),
        },
    )
}

fn compose_cmd(matches: &ArgMatches) -> Result<()> {
    let config =
        Config::from_directory(Path::new(matches.value_of("blog").unwrap()))?;
    let editor = match matches.value_of("editor") {
        Some(editor) => Some(editor.to_owned()),
        None => std::env::var("EDITOR").ok(),
    };
    compose(
        &Store::new(config.posts_directory),
        Compose {
            title: matches.value_of("title").unwrap().to_owned(),
            key: matches.value_of("key").map(str::to_owned),
            tags: matches
                .values_of("tag")
                .map(|tags| tags.map(str::to_owned).collect())
                .unwrap_or_default(),
            editor,
        },
    )
}

fn build_cmd(matches: &ArgMatches) -> Result<()> {
    let config =
        Config::from_directory(Path::new(matches.value_of("blog").unwrap()))?;
    std::fs::create_dir_all(matches.value_of("output").unwrap())?;
    build_site(&config, Path::new(matches.value_of("output").unwrap()))?;
    Ok(())
}
