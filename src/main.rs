//! `hobbyvault` command line front end

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hobbyvault::toolbox::{caesar, color};
use hobbyvault::utils::mask_string;
use hobbyvault::{
    generate_clever_password, generate_password, PasswordOptions, Settings, Translations, Vault,
    VaultError, SETTINGS_FILENAME,
};

#[derive(Debug, Parser)]
#[command(name = "hobbyvault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Multi-user password vault and a few small tools")]
struct Cli {
    /// Vault folder
    #[arg(short, long, global = true, env = "HOBBYVAULT_FOLDER", default_value = ".")]
    folder: PathBuf,

    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Account used for vault commands
#[derive(Debug, Args)]
struct Account {
    /// Username
    #[arg(short, long)]
    user: String,

    /// Account password
    #[arg(short, long, env = "HOBBYVAULT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account (and the vault, if the folder has none)
    Register {
        username: String,
        email: String,
        #[arg(short, long, env = "HOBBYVAULT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Save a website credential
    Add {
        #[command(flatten)]
        account: Account,
        website: String,
        /// Login name on the website
        #[arg(long, default_value = "")]
        login: String,
        /// Email used on the website
        #[arg(long, default_value = "")]
        email: String,
        /// Website password; a random one is generated when omitted
        #[arg(long)]
        secret: Option<String>,
        /// Replace an existing credential
        #[arg(long)]
        overwrite: bool,
    },
    /// Show a website credential
    Get {
        #[command(flatten)]
        account: Account,
        website: String,
        /// Print the password instead of asterisks
        #[arg(long)]
        show: bool,
    },
    /// List saved websites
    List {
        #[command(flatten)]
        account: Account,
        /// Only websites, logins or emails containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete a website credential
    Delete {
        #[command(flatten)]
        account: Account,
        website: String,
    },
    /// Export credentials as plain JSON
    Export {
        #[command(flatten)]
        account: Account,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Take a manual backup, or list existing ones
    Backup {
        #[arg(long)]
        list: bool,
    },
    /// Restore the vault database from a backup file
    Restore {
        backup: PathBuf,
    },
    /// Generate random passwords
    Generate {
        /// Pattern, one output character per pattern character: a lowercase
        /// letter gives a random lowercase letter, an uppercase letter an
        /// uppercase one, a digit a digit, one of !#$%&()*+ a symbol and
        /// anything else a random character of any class
        #[arg(long)]
        pattern: Option<String>,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Caesar cipher
    Caesar {
        text: String,
        #[arg(allow_negative_numbers = true)]
        shift: Option<i32>,
        #[arg(short, long)]
        decode: bool,
        /// Print every possible decryption
        #[arg(long, conflicts_with = "shift")]
        brute: bool,
    },
    /// Show a hex color in RGB, HSV and HSL
    Color {
        hex: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(folder = %cli.folder.display(), "starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", localized_message(&cli.folder, e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// Translate vault errors into the configured language
fn localized_message(folder: &Path, err: &(dyn Error + 'static)) -> String {
    let Some(vault_err) = err.downcast_ref::<VaultError>() else {
        return err.to_string();
    };
    let language = Settings::load(&folder.join(SETTINGS_FILENAME))
        .map(|s| s.language)
        .unwrap_or_else(|_| "en".to_string());
    match Translations::for_language(&language) {
        Ok(tr) => tr.error_message(vault_err),
        Err(_) => vault_err.to_string(),
    }
}

fn open_session(folder: &Path, account: &Account) -> hobbyvault::Result<Vault> {
    let mut vault = Vault::open(folder)?;
    vault.login(&account.user, &account.password)?;
    Ok(vault)
}

/// Close the vault, reporting an automatic backup
fn finish(mut vault: Vault) -> hobbyvault::Result<()> {
    if let Some(path) = vault.close()? {
        info!(path = %path.display(), "automatic backup taken");
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let folder = cli.folder.as_path();

    match &cli.command {
        Command::Register { username, email, password } => {
            let mut vault = Vault::open_or_create(folder)?;
            vault.register(username, email, password)?;
            println!("Registered {}", username.trim());
            finish(vault)?;
        }
        Command::Add { account, website, login, email, secret, overwrite } => {
            let mut vault = open_session(folder, account)?;
            let password = match secret {
                Some(secret) => secret.clone(),
                None => generate_password(&PasswordOptions::default()),
            };
            if *overwrite {
                vault.save_credential(website, login, email, &password)?;
            } else {
                vault.add_credential(website, login, email, &password)?;
            }
            println!("Saved {}", website.trim());
            finish(vault)?;
        }
        Command::Get { account, website, show } => {
            let mut vault = open_session(folder, account)?;
            let credential = vault.get_credential(website)?;
            let password = if *show { credential.password.clone() } else { mask_string(&credential.password) };
            println!("website:  {}", credential.website);
            println!("login:    {}", credential.login);
            println!("email:    {}", credential.email);
            println!("password: {}", password);
            finish(vault)?;
        }
        Command::List { account, search } => {
            let mut vault = open_session(folder, account)?;
            let websites: Vec<String> = match search {
                Some(query) => vault.search_credentials(query)?.into_iter().map(|c| c.website).collect(),
                None => vault.list_websites()?,
            };
            for website in websites {
                println!("{}", website);
            }
            finish(vault)?;
        }
        Command::Delete { account, website } => {
            let mut vault = open_session(folder, account)?;
            vault.delete_credential(website)?;
            println!("Deleted {}", website.trim());
            finish(vault)?;
        }
        Command::Export { account, output } => {
            let mut vault = open_session(folder, account)?;
            match output {
                Some(path) => {
                    let count = vault.export_to_file(path)?;
                    println!("Exported {} credentials to {}", count, path.display());
                }
                None => println!("{}", vault.export_json()?),
            }
            finish(vault)?;
        }
        Command::Backup { list } => {
            let vault = Vault::open(folder)?;
            if *list {
                for backup in vault.backup_manager().list_backups()? {
                    println!(
                        "{}  {:>8}  {:?}  {}",
                        backup.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        backup.size,
                        backup.kind,
                        backup.path.display()
                    );
                }
            } else {
                let path = vault.backup_now()?;
                println!("Backup written to {}", path.display());
            }
        }
        Command::Restore { backup } => {
            let mut vault = Vault::open(folder)?;
            vault.restore_backup(backup)?;
            println!("Restored {}", backup.display());
        }
        Command::Generate { pattern, count } => {
            for _ in 0..*count {
                let password = match pattern {
                    Some(pattern) => generate_clever_password(pattern),
                    None => generate_password(&PasswordOptions::default()),
                };
                println!("{}", password);
            }
        }
        Command::Caesar { text, shift, decode, brute } => {
            if *brute {
                for (shift, candidate) in caesar::brute_force(text) {
                    println!("{:>2}: {}", shift, candidate);
                }
            } else {
                let shift = shift.unwrap_or(3);
                let result = if *decode { caesar::decrypt(text, shift) } else { caesar::encrypt(text, shift) };
                println!("{}", result);
            }
        }
        Command::Color { hex } => {
            let rgb = color::Rgb::from_hex(hex)?;
            let hsv = color::rgb_to_hsv(rgb);
            let hsl = color::rgb_to_hsl(rgb);
            println!("hex: {}", rgb.to_hex());
            println!("rgb: {}, {}, {}", rgb.r, rgb.g, rgb.b);
            println!("hsv: {:.1}, {:.3}, {:.3}", hsv.h, hsv.s, hsv.v);
            println!("hsl: {:.1}, {:.3}, {:.3}", hsl.h, hsl.s, hsl.l);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_pattern_help_names_classes() {
        let cli = Cli::command();
        let generate = cli.find_subcommand("generate").unwrap();
        let pattern = generate.get_arguments().find(|a| a.get_id() == "pattern").unwrap();
        let help = pattern.get_help().unwrap().to_string();
        for class in ["lowercase", "uppercase", "digit", "symbol", "any class"] {
            assert!(help.contains(class), "{}", help);
        }
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from(["hobbyvault", "generate", "--pattern", "Aa0!", "-n", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Generate { pattern: Some(ref p), count: 3 } if p == "Aa0!"));
    }
}
