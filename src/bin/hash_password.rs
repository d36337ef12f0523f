use std::io::{self};

use clap::Parser;

use fintrack::password::{PasswordHash, ValidatedPassword};

/// A utility for creating the password hash of a user in the config file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The bcrypt cost, higher values take longer to verify.
    #[arg(long, default_value_t = PasswordHash::DEFAULT_COST)]
    cost: u32,
}

fn main() {
    let args = Args::parse();

    if let Some(password_hash) = get_new_password_hash(args.cost) {
        println!("{password_hash}");
    }
}

fn get_new_password_hash(cost: u32) -> Option<PasswordHash> {
    loop {
        let first_password = match rpassword::prompt_password("Enter a new password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if let Err(error) = ValidatedPassword::new(&first_password) {
            print_error(error);
            continue;
        }

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&first_password, cost) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("Could not hash password: {error}. Try again.")),
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
