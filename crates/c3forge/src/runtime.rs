//! Line-oriented driver over the editor entry points.
//!
//! Reads one command per line and maps it onto [`App::select`],
//! [`App::toggle_folder`], [`App::edit_content`], and [`App::send`].

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, Lines};
use tokio::sync::mpsc;

use crate::app::App;
use crate::app::chat::SendOutcome;
use crate::domain::chat::MessageRole;
use crate::domain::project::{Node, NodeId, TreeRow};

/// Line that ends multi-line content entry.
const EDIT_TERMINATOR: &str = ".";
const EMPTY_EDITOR_MESSAGE: &str = "Select a file to view or edit code";
const HELP_TEXT: &str =
    "commands: ls | select <id> | toggle <id> | show | edit | ask <message> | log | help | quit";

/// One parsed driver command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Edit,
    Help,
    List,
    Log,
    Quit,
    Select(NodeId),
    Show,
    Toggle(NodeId),
}

impl Command {
    /// Parses one input line.
    ///
    /// # Errors
    /// Returns a user-facing message for unknown commands or missing
    /// arguments.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, argument)| (name, argument.trim()));

        match (name, argument) {
            ("ask", text) if !text.is_empty() => Ok(Self::Ask(text.to_string())),
            ("edit", "") => Ok(Self::Edit),
            ("help", "") => Ok(Self::Help),
            ("ls", "") => Ok(Self::List),
            ("log", "") => Ok(Self::Log),
            ("quit" | "exit", "") => Ok(Self::Quit),
            ("select", id) if !id.is_empty() => Ok(Self::Select(NodeId::new(id))),
            ("show", "") => Ok(Self::Show),
            ("toggle", id) if !id.is_empty() => Ok(Self::Toggle(NodeId::new(id))),
            _ => Err(format!("unknown command `{line}`; try `help`")),
        }
    }
}

/// Input or completion observed by one driver loop iteration.
enum Event {
    Line(io::Result<Option<String>>),
    Reply(SendOutcome),
}

/// Runs commands from `input` until `quit` or end of input.
///
/// `ask` runs on its own task, so edits, toggles, and selection changes keep
/// working while the assistant answers. Replies are printed as they arrive;
/// pending replies are awaited before returning.
///
/// # Errors
/// Returns an error when reading input or writing output fails.
pub async fn run<R, W>(app: Arc<App>, input: R, output: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
    let mut in_flight = 0_usize;
    let mut lines = input.lines();
    writeln!(output, "{HELP_TEXT}")?;

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line),
            Some(outcome) = reply_rx.recv() => Event::Reply(outcome),
        };

        let line = match event {
            Event::Line(line) => match line? {
                Some(line) => line,
                None => break,
            },
            Event::Reply(outcome) => {
                in_flight -= 1;
                write_reply(&app, outcome, output)?;

                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{message}")?;

                continue;
            }
        };

        match command {
            Command::Ask(text) => {
                let app = Arc::clone(&app);
                let reply_tx = reply_tx.clone();
                in_flight += 1;
                tokio::spawn(async move {
                    let outcome = app.send(&text).await;
                    let _ = reply_tx.send(outcome);
                });
            }
            Command::Edit => {
                let content = read_until_terminator(&mut lines).await?;
                app.edit_content(content);
            }
            Command::Help => writeln!(output, "{HELP_TEXT}")?,
            Command::List => {
                let selected_id = app.selected_id();
                write!(
                    output,
                    "{}",
                    render_rows(&app.visible_rows(), selected_id.as_ref())
                )?;
            }
            Command::Log => {
                for message in app.messages() {
                    writeln!(output, "[{}] {}", message.role, message.text)?;
                }
            }
            Command::Quit => break,
            Command::Select(id) => app.select(id),
            Command::Show => write!(output, "{}", render_selected(app.selected_node().as_deref()))?,
            Command::Toggle(id) => app.toggle_folder(&id),
        }
    }

    while in_flight > 0 {
        let Some(outcome) = reply_rx.recv().await else {
            break;
        };
        in_flight -= 1;
        write_reply(&app, outcome, output)?;
    }

    Ok(())
}

/// Prints the latest model message for a finished `ask`.
fn write_reply<W: Write>(app: &App, outcome: SendOutcome, output: &mut W) -> io::Result<()> {
    if outcome == SendOutcome::Rejected {
        return writeln!(output, "assistant is still answering");
    }

    let reply = app
        .messages()
        .into_iter()
        .rev()
        .find(|message| message.role == MessageRole::Model);
    if let Some(reply) = reply {
        writeln!(output, "{}", reply.text)?;
    }

    Ok(())
}

/// Collects lines up to [`EDIT_TERMINATOR`] or end of input.
async fn read_until_terminator<R>(lines: &mut Lines<R>) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut collected = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line == EDIT_TERMINATOR {
            break;
        }

        collected.push(line);
    }

    Ok(collected.join("\n"))
}

/// Renders explorer rows indented by depth, marking the selected row.
pub fn render_rows(rows: &[TreeRow], selected_id: Option<&NodeId>) -> String {
    let mut rendered = String::new();
    for row in rows {
        let cursor = if Some(row.node.id()) == selected_id {
            '>'
        } else {
            ' '
        };
        let icon = match row.node.as_ref() {
            Node::Folder(folder) if folder.is_expanded => "v ",
            Node::Folder(_) => "> ",
            Node::File(_) => "  ",
        };
        let indent = "  ".repeat(row.depth);
        let _ = writeln!(
            rendered,
            "{cursor} {indent}{icon}{} [{}]",
            row.node.name(),
            row.node.id()
        );
    }

    rendered
}

/// Renders the selected file with a line-number gutter.
fn render_selected(node: Option<&Node>) -> String {
    let Some(Node::File(file)) = node else {
        return format!("{EMPTY_EDITOR_MESSAGE}\n");
    };

    let mut rendered = format!("-- {} --\n", file.name);
    for (index, line) in file.content.as_deref().unwrap_or_default().lines().enumerate() {
        let _ = writeln!(rendered, "{:>4} | {line}", index + 1);
    }

    rendered
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::io::{AsyncWriteExt as _, BufReader};
    use tokio::sync::oneshot;

    use super::*;
    use crate::infra::oracle::{MockAssistantOracle, OracleError};

    /// Output sink readable while the driver is still running.
    #[derive(Clone, Default)]
    struct SharedOutput(Arc<Mutex<Vec<u8>>>);

    impl SharedOutput {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("output lock")).into_owned()
        }
    }

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("output lock").extend_from_slice(buf);

            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn seeded_app(oracle: MockAssistantOracle) -> Arc<App> {
        Arc::new(App::with_seed_project(Arc::new(oracle)).expect("seed project should load"))
    }

    async fn run_script(app: &Arc<App>, script: &str) -> String {
        let mut output = Vec::new();
        run(Arc::clone(app), script.as_bytes(), &mut output)
            .await
            .expect("script should run");

        String::from_utf8(output).expect("output should be utf-8")
    }

    #[test]
    fn test_parse_recognizes_commands_with_arguments() {
        // Arrange
        let lines = ["ask  add a dash ", "select file-main-js", "toggle folder-events", "exit"];

        // Act
        let commands: Vec<Command> = lines
            .iter()
            .map(|line| Command::parse(line).expect("command should parse"))
            .collect();

        // Assert
        assert_eq!(
            commands,
            vec![
                Command::Ask("add a dash".to_string()),
                Command::Select(NodeId::new("file-main-js")),
                Command::Toggle(NodeId::new("folder-events")),
                Command::Quit,
            ]
        );
    }

    #[test]
    fn test_parse_rejects_missing_arguments_and_unknown_commands() {
        // Arrange
        let lines = ["select", "ask   ", "ls now", "rm -rf"];

        // Act
        let results: Vec<Result<Command, String>> =
            lines.iter().map(|line| Command::parse(line)).collect();

        // Assert
        assert!(results.iter().all(Result::is_err));
    }

    #[test]
    fn test_render_rows_indents_and_marks_selection() {
        // Arrange
        let tree = crate::domain::seed::initial_project().expect("seed project should build");
        let selected = NodeId::new("file-main-js");

        // Act
        let rendered = render_rows(&tree.visible_rows(), Some(&selected));

        // Assert
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "    project.c3proj [root-project]");
        assert_eq!(lines[1], "  v scripts [folder-scripts]");
        assert_eq!(lines[2], ">     main.js [file-main-js]");
        assert_eq!(lines[4], "  > eventSheets [folder-events]");
    }

    #[test]
    fn test_render_selected_numbers_lines_and_handles_folders() {
        // Arrange
        let file = Node::file("a", "a.js", Some("one\ntwo".to_string()));
        let folder = Node::folder("dir", "dir", true, Vec::new());

        // Act
        let file_view = render_selected(Some(&file));
        let folder_view = render_selected(Some(&folder));

        // Assert
        assert_eq!(file_view, "-- a.js --\n   1 | one\n   2 | two\n");
        assert_eq!(folder_view, format!("{EMPTY_EDITOR_MESSAGE}\n"));
    }

    #[tokio::test]
    async fn test_run_edits_and_shows_selected_file() {
        // Arrange
        let app = seeded_app(MockAssistantOracle::new());
        let script = "select file-utils-js\nedit\nfirst\nsecond\n.\nshow\nquit\nshow\n";

        // Act
        let output = run_script(&app, script).await;

        // Assert
        assert!(output.contains("-- utils.js --\n   1 | first\n   2 | second\n"));
        assert_eq!(output.matches("-- utils.js --").count(), 1);
    }

    #[tokio::test]
    async fn test_run_prints_assistant_reply_before_returning() {
        // Arrange
        let mut oracle = MockAssistantOracle::new();
        oracle
            .expect_invoke()
            .times(1)
            .returning(|_| Box::pin(async { Ok::<_, OracleError>("try runtime.mouse".to_string()) }));
        let app = seeded_app(oracle);

        // Act
        let output = run_script(&app, "ask how do I aim?\nbogus\n").await;

        // Assert
        assert!(output.contains("unknown command `bogus`"));
        assert!(output.ends_with("try runtime.mouse\n"));
        let transcript: Vec<(MessageRole, String)> = app
            .messages()
            .into_iter()
            .map(|message| (message.role, message.text))
            .collect();
        assert_eq!(
            transcript,
            vec![
                (MessageRole::User, "how do I aim?".to_string()),
                (MessageRole::Model, "try runtime.mouse".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_accepts_commands_while_reply_is_pending() {
        // Arrange
        let (reply_tx, reply_rx) = oneshot::channel::<String>();
        let mut oracle = MockAssistantOracle::new();
        oracle.expect_invoke().times(1).return_once(move |_| {
            Box::pin(async move { Ok::<_, OracleError>(reply_rx.await.unwrap_or_default()) })
        });
        let app = seeded_app(oracle);
        let (mut input_tx, input_rx) = tokio::io::duplex(1024);
        let output = SharedOutput::default();
        let driver = tokio::spawn({
            let app = Arc::clone(&app);
            let mut output = output.clone();

            async move { run(app, BufReader::new(input_rx), &mut output).await }
        });

        // Act
        input_tx
            .write_all(b"ask add a dash\n")
            .await
            .expect("driver should read input");
        while !app.is_generating() {
            tokio::task::yield_now().await;
        }
        input_tx
            .write_all(b"edit\n// dash added\n.\nask again\n")
            .await
            .expect("driver should read input");
        while !output.text().contains("assistant is still answering") {
            tokio::task::yield_now().await;
        }
        reply_tx
            .send("done".to_string())
            .expect("oracle call should be pending");
        drop(input_tx);
        driver
            .await
            .expect("driver task should finish")
            .expect("driver should run");

        // Assert
        assert!(output.text().ends_with("done\n"));
        assert_eq!(
            app.tree()
                .find(&NodeId::new("file-main-js"))
                .and_then(|node| node.content()),
            Some("// dash added")
        );
        let roles: Vec<MessageRole> = app.messages().iter().map(|message| message.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Model]);
    }
}
