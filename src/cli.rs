//! Minimal CLI parsing for the admin commands.

use std::env;

use anyhow::{Result, bail};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CreateUserArgs {
    pub email: String,
    pub name: String,
    pub password: String,
    pub roles: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    /// `create-user --email E --name N --password P [--role ROLE]...`
    CreateUser(CreateUserArgs),
}

impl Command {
    pub fn from_args() -> Result<Self> {
        Self::parse(env::args().skip(1))
    }

    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        match args.next().as_deref() {
            None | Some("serve") => Ok(Command::Serve),
            Some("create-user") => parse_create_user(args).map(Command::CreateUser),
            Some(other) => bail!("Unknown command '{other}'"),
        }
    }
}

fn parse_create_user(mut args: impl Iterator<Item = String>) -> Result<CreateUserArgs> {
    let mut parsed = CreateUserArgs::default();
    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        let Some(value) = inline.or_else(|| args.next()) else {
            bail!("Missing value for {flag}");
        };
        match flag.as_str() {
            "--email" => parsed.email = value,
            "--name" => parsed.name = value,
            "--password" => parsed.password = value,
            "--role" => parsed.roles.push(value),
            _ => bail!("Unknown option '{flag}'"),
        }
    }

    if parsed.email.is_empty() || parsed.password.is_empty() {
        bail!("create-user needs --email and --password");
    }
    if parsed.name.is_empty() {
        parsed.name = parsed.email.clone();
    }
    if parsed.roles.is_empty() {
        parsed.roles.push("USERS".to_string());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_is_serve() {
        assert_eq!(Command::parse(args(&[])).unwrap(), Command::Serve);
    }

    #[test]
    fn test_create_user() {
        let command = Command::parse(args(&[
            "create-user",
            "--email",
            "ed@example.org",
            "--password=secret",
            "--role",
            "USERS",
            "--role",
            "ADMINS",
        ]))
        .unwrap();
        assert_eq!(
            command,
            Command::CreateUser(CreateUserArgs {
                email: "ed@example.org".into(),
                name: "ed@example.org".into(),
                password: "secret".into(),
                roles: vec!["USERS".into(), "ADMINS".into()],
            })
        );
    }

    #[test]
    fn test_create_user_errors() {
        assert!(Command::parse(args(&["create-user", "--email"])).is_err());
        assert!(Command::parse(args(&["create-user", "--email", "a@b"])).is_err());
        assert!(Command::parse(args(&["drop-tables"])).is_err());
    }
}
