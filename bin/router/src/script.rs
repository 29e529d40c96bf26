use std::str::FromStr;

use tracing::{info, warn};

use crate::{
    app::{App, Screen},
    navigation::History,
    routes::{RouteName, RouteParams},
    session::SessionError,
};

/// The session the demo binary plays when no script is given.
pub const DEFAULT_SCRIPT: &str = r#"
# anonymous visitors are sent to the login page
visit /posts/42
login viewer
go postComments id=42
# viewers cannot edit
go postEdit id=42
visit /posts/42/edit
back
logout
login admin
go postEdit id=42
go createPost
visit /nowhere
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Visit(String),
    Go(RouteName, RouteParams),
    Back,
    Login(String),
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: '{command}' expects an argument")]
    MissingArgument { line: usize, command: String },
    #[error("line {line}: unknown route '{route}'")]
    UnknownRoute { line: usize, route: String },
    #[error("line {line}: parameter '{param}' must look like name=value")]
    InvalidParam { line: usize, param: String },
}

/// Parses one command per line. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = vec![];

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let mut words = raw.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let mut argument = || {
            words.next().ok_or_else(|| ScriptError::MissingArgument {
                line,
                command: command.to_string(),
            })
        };

        let parsed = match command {
            "visit" => Command::Visit(argument()?.to_string()),
            "login" => Command::Login(argument()?.to_string()),
            "logout" => Command::Logout,
            "back" => Command::Back,
            "go" => {
                let route = argument()?;
                let route = RouteName::from_str(route).map_err(|_| ScriptError::UnknownRoute {
                    line,
                    route: route.to_string(),
                })?;

                let mut params = RouteParams::new();
                for param in words.by_ref() {
                    let (name, value) =
                        param
                            .split_once('=')
                            .ok_or_else(|| ScriptError::InvalidParam {
                                line,
                                param: param.to_string(),
                            })?;
                    params.insert(name, value);
                }

                Command::Go(route, params)
            }
            other => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: other.to_string(),
                })
            }
        };

        commands.push(parsed);
    }

    Ok(commands)
}

fn describe(app: &App, screen: Option<Screen>) {
    match screen {
        Some(screen) => info!(
            path = %app.history().current().path,
            route = %screen.snapshot.route,
            view = screen.view,
            title = %screen.title,
            "rendered"
        ),
        None => info!("navigation superseded"),
    }
}

/// Plays `commands` against `app`, one at a time.
///
/// Refused navigations and unknown login profiles are logged and the script
/// goes on; they are part of what a script exercises.
pub async fn run_script(app: &App, commands: &[Command]) {
    for command in commands {
        info!(command = ?command, "running");

        match command {
            Command::Visit(path) => describe(app, app.visit(path).await),
            Command::Back => describe(app, app.back().await),
            Command::Go(route, params) => match app.go(*route, params).await {
                Ok(screen) => describe(app, screen),
                Err(err) => warn!("{}", err),
            },
            Command::Login(profile) => match app.login(profile).await {
                Ok(screen) => describe(app, screen),
                Err(err @ SessionError::UnknownProfile(_)) => warn!(
                    available = ?app.session().identities().profiles().collect::<Vec<_>>(),
                    "{}",
                    err
                ),
                Err(err) => warn!("login failed: {}", err),
            },
            Command::Logout => match app.logout().await {
                Ok(screen) => describe(app, screen),
                Err(err) => warn!("logout failed: {}", err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use route_gate_config::identities::IdentitiesConfig;

    use super::{parse_script, run_script, Command, ScriptError, DEFAULT_SCRIPT};
    use crate::{
        app::App,
        bundles::TranslationStore,
        navigation::History,
        routes::{default_route_table, RouteName, RouteParams},
        session::{Identities, Session},
        testkit::init_logger,
    };

    fn app() -> App {
        init_logger();

        App::new(
            default_route_table().unwrap(),
            Session::new(Identities::from_config(&IdentitiesConfig::default()).unwrap()),
            Arc::new(TranslationStore::new(None, "tr", "en")),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn parses_every_command() {
        let commands = parse_script(
            "
            # comment
            visit /posts
            go post id=3 tab=comments
            back
            login admin
            logout
            ",
        )
        .unwrap();

        assert_eq!(
            commands,
            vec![
                Command::Visit("/posts".to_string()),
                Command::Go(
                    RouteName::Post,
                    RouteParams::new().with("id", 3).with("tab", "comments")
                ),
                Command::Back,
                Command::Login("admin".to_string()),
                Command::Logout,
            ]
        );
    }

    #[test]
    fn reports_the_offending_line() {
        assert_eq!(
            parse_script("visit /\ngo settings"),
            Err(ScriptError::UnknownRoute {
                line: 2,
                route: "settings".to_string()
            })
        );
        assert_eq!(
            parse_script("login"),
            Err(ScriptError::MissingArgument {
                line: 1,
                command: "login".to_string()
            })
        );
        assert_eq!(
            parse_script("go post 3"),
            Err(ScriptError::InvalidParam {
                line: 1,
                param: "3".to_string()
            })
        );
        assert!(matches!(
            parse_script("jump /"),
            Err(ScriptError::UnknownCommand { line: 1, .. })
        ));
    }

    #[test]
    fn default_script_is_valid() {
        assert_eq!(parse_script(DEFAULT_SCRIPT).unwrap().len(), 11);
    }

    #[tokio::test]
    async fn runs_a_script_against_the_app() {
        let app = app();
        let commands = parse_script("visit /posts/42\nlogin viewer\ngo postEdit id=42").unwrap();

        run_script(&app, &commands).await;

        assert_eq!(app.history().current().path, "/posts/42");
        assert!(app.session().current().is_some());
    }

    #[tokio::test]
    async fn plays_the_default_script_to_the_end() {
        let app = app();

        run_script(&app, &parse_script(DEFAULT_SCRIPT).unwrap()).await;

        assert_eq!(app.history().current().path, "/nowhere");
    }
}
