use base64::{engine::general_purpose::STANDARD, Engine as _};
use mail_parser::MessageParser;
use mailer::{Error, Mailer, MailerConfig};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

/// What the SMTP server received during one session.
#[derive(Debug, Default)]
struct Session {
    cmds: Vec<String>,
    data: String,
}

impl Session {
    fn find(&self, prefix: &str) -> Vec<&str> {
        self.cmds
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

/// Plays one scripted SMTP session.
///
/// The session is recorded before the QUIT reply, so it is available
/// as soon as the client is done.
async fn serve_session(
    stream: TcpStream,
    accept_auth: bool,
    sessions: UnboundedSender<Session>,
) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut session = Session::default();
    let mut line = String::new();

    writer.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            break;
        }

        let cmd = line.trim_end().to_owned();
        let verb = cmd
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        session.cmds.push(cmd);

        let reply: &[u8] = match verb.as_str() {
            "EHLO" | "HELO" => b"250-localhost\r\n250 AUTH PLAIN\r\n",
            "AUTH" if accept_auth => b"235 2.7.0 Authentication successful\r\n",
            "AUTH" => b"535 5.7.8 Authentication credentials invalid\r\n",
            "DATA" => {
                writer.write_all(b"354 Start mail input\r\n").await.unwrap();
                loop {
                    line.clear();
                    if reader.read_line(&mut line).await.unwrap() == 0 || line == ".\r\n" {
                        break;
                    }
                    session.data.push_str(&line);
                }
                b"250 2.0.0 OK\r\n"
            }
            "QUIT" => {
                let _ = sessions.send(session);
                writer.write_all(b"221 2.0.0 Bye\r\n").await.unwrap();
                return;
            }
            _ => b"250 2.0.0 OK\r\n",
        };

        writer.write_all(reply).await.unwrap();
    }

    let _ = sessions.send(session);
}

/// Spawns a scripted SMTP server accepting one session.
async fn spawn_smtp_server(accept_auth: bool) -> (u16, JoinHandle<Session>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        serve_session(stream, accept_auth, tx).await;
        rx.recv().await.unwrap()
    });

    (port, handle)
}

/// Spawns a scripted SMTP server accepting any number of sessions,
/// concurrently.
async fn spawn_smtp_listener(accept_auth: bool) -> (u16, UnboundedReceiver<Session>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::spawn(serve_session(stream, accept_auth, tx.clone()));
        }
    });

    (port, rx)
}

fn drain(sessions: &mut UnboundedReceiver<Session>) -> Vec<Session> {
    let mut drained = Vec::new();
    while let Ok(session) = sessions.try_recv() {
        drained.push(session);
    }
    drained
}

fn smtp_config(port: u16, username: &str) -> MailerConfig {
    MailerConfig {
        host: "127.0.0.1".into(),
        port,
        username: username.into(),
        password: "password".into(),
        ..Default::default()
    }
}

fn auth_plain(username: &str, password: &str) -> String {
    let token = STANDARD.encode(format!("\0{username}\0{password}"));
    format!("AUTH PLAIN {token}")
}

#[test_log::test(tokio::test)]
async fn test_smtp_send() {
    let (port, server) = spawn_smtp_server(true).await;
    let mailer = Mailer::new(smtp_config(port, "alice@localhost"));

    mailer
        .send(
            "Plain message!",
            "<h1>Hello, world!</h1>",
            ["bob@localhost", "carol@localhost"],
        )
        .await
        .unwrap();

    let session = server.await.unwrap();

    assert_eq!(
        session.find("AUTH"),
        [auth_plain("alice@localhost", "password")]
    );
    assert_eq!(session.find("MAIL FROM"), ["MAIL FROM:<alice@localhost>"]);
    assert_eq!(
        session.find("RCPT TO"),
        ["RCPT TO:<bob@localhost>", "RCPT TO:<carol@localhost>"]
    );
    assert_eq!(session.cmds.last().map(String::as_str), Some("QUIT"));

    assert!(session.data.starts_with("From: alice <alice@localhost>\r\n"));
    assert!(session
        .data
        .contains("To: bob@localhost,carol@localhost\r\n"));
    assert!(session.data.contains("Content-Transfer-Encoding: base64\r\n"));

    let msg = MessageParser::new()
        .parse(session.data.as_bytes())
        .unwrap();
    assert_eq!(msg.subject(), Some("Plain message!"));
    assert_eq!(msg.body_html(0).unwrap(), "<h1>Hello, world!</h1>");

    assert!(mailer.is_authenticated().await);
}

#[test_log::test(tokio::test)]
async fn test_smtp_envelope_sender_is_username() {
    let (port, server) = spawn_smtp_server(true).await;
    let mailer = Mailer::new(MailerConfig {
        from_addr: "support@localhost".into(),
        from_alias: "Support Team".into(),
        ..smtp_config(port, "alice@localhost")
    });

    mailer
        .send("Ticket", "<p>Done</p>", ["bob@localhost"])
        .await
        .unwrap();

    let session = server.await.unwrap();
    assert_eq!(session.find("MAIL FROM"), ["MAIL FROM:<alice@localhost>"]);
    assert!(session
        .data
        .starts_with("From: Support Team <support@localhost>\r\n"));
}

#[test_log::test(tokio::test)]
async fn test_smtp_update_config_between_sends() {
    let (alice_port, alice_server) = spawn_smtp_server(true).await;
    let (bob_port, bob_server) = spawn_smtp_server(true).await;

    let mailer = Mailer::new(smtp_config(alice_port, "alice@localhost"));
    mailer
        .send("First", "first", ["carol@localhost"])
        .await
        .unwrap();

    mailer
        .update_config(MailerConfig {
            password: "secret".into(),
            ..smtp_config(bob_port, "bob@localhost")
        })
        .await;
    assert!(!mailer.is_authenticated().await);

    mailer
        .send("Second", "second", ["carol@localhost"])
        .await
        .unwrap();

    let alice = alice_server.await.unwrap();
    assert_eq!(alice.find("AUTH"), [auth_plain("alice@localhost", "password")]);
    assert_eq!(alice.find("MAIL FROM"), ["MAIL FROM:<alice@localhost>"]);

    let bob = bob_server.await.unwrap();
    assert_eq!(bob.find("AUTH"), [auth_plain("bob@localhost", "secret")]);
    assert_eq!(bob.find("MAIL FROM"), ["MAIL FROM:<bob@localhost>"]);
    assert!(bob.data.starts_with("From: bob <bob@localhost>\r\n"));
}

#[test_log::test(tokio::test)]
async fn test_smtp_auth_rejected() {
    let (port, server) = spawn_smtp_server(false).await;
    let mailer = Mailer::new(smtp_config(port, "alice@localhost"));

    let err = mailer
        .send("Plain message!", "body", ["bob@localhost"])
        .await
        .unwrap_err();

    assert!(err.is_transport_error(), "unexpected error: {err:?}");
    assert!(matches!(err, Error::ConnectSmtpError(..)));

    let session = server.await.unwrap();
    assert!(session.find("MAIL FROM").is_empty());
    assert!(session.data.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_smtp_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mailer = Mailer::new(smtp_config(port, "alice@localhost"));
    let err = mailer
        .send("Plain message!", "body", ["bob@localhost"])
        .await
        .unwrap_err();

    match err {
        Error::ConnectSmtpError(_, addr) => assert_eq!(addr, format!("127.0.0.1:{port}")),
        err => panic!("unexpected error: {err:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_smtp_missing_credentials() {
    let mailer = Mailer::new(MailerConfig {
        password: String::new(),
        ..smtp_config(2525, "alice@localhost")
    });

    let err = mailer
        .send("Plain message!", "body", ["bob@localhost"])
        .await
        .unwrap_err();

    assert!(err.is_config_error());
}

#[test_log::test(tokio::test)]
async fn test_smtp_multiline_recipient_is_rejected() {
    let (port, server) = spawn_smtp_server(true).await;
    let mailer = Mailer::new(smtp_config(port, "alice@localhost"));

    let err = mailer
        .send(
            "Plain message!",
            "body",
            ["bob@localhost>\r\nRCPT TO:<eve@evil.com"],
        )
        .await
        .unwrap_err();
    assert!(err.is_input_error());
    assert!(matches!(err, Error::InvalidRecipientError(_)));
    assert!(!mailer.is_authenticated().await);

    mailer
        .send("Plain message!", "body", ["bob@localhost"])
        .await
        .unwrap();

    let session = server.await.unwrap();
    assert_eq!(session.find("RCPT TO"), ["RCPT TO:<bob@localhost>"]);
    assert!(session.cmds.iter().all(|cmd| !cmd.contains("evil.com")));
}

#[test_log::test(tokio::test)]
async fn test_smtp_long_non_ascii_subject() {
    let (port, server) = spawn_smtp_server(true).await;
    let mailer = Mailer::new(smtp_config(port, "alice@localhost"));

    let subject = "Compte rendu de la réunion d'équipe à Genève, édition spéciale";
    mailer
        .send(subject, "<p>Ça va ?</p>", ["bob@localhost"])
        .await
        .unwrap();

    let session = server.await.unwrap();
    let msg = MessageParser::new()
        .parse(session.data.as_bytes())
        .unwrap();
    assert_eq!(msg.subject(), Some(subject));
}

#[test_log::test(tokio::test)]
async fn test_smtp_concurrent_sends_and_update_config() {
    let (alice_port, mut alice_sessions) = spawn_smtp_listener(true).await;
    let (bob_port, mut bob_sessions) = spawn_smtp_listener(true).await;

    let mailer = Mailer::new(smtp_config(alice_port, "alice@localhost"));
    let bob_config = MailerConfig {
        password: "secret".into(),
        ..smtp_config(bob_port, "bob@localhost")
    };

    let (first, (), second) = tokio::join!(
        mailer.send("First", "first", ["carol@localhost"]),
        mailer.update_config(bob_config),
        mailer.send("Second", "second", ["carol@localhost"])
    );
    first.unwrap();
    second.unwrap();

    // every session uses one configuration from end to end
    let alice = drain(&mut alice_sessions);
    for session in &alice {
        assert_eq!(session.find("AUTH"), [auth_plain("alice@localhost", "password")]);
        assert_eq!(session.find("MAIL FROM"), ["MAIL FROM:<alice@localhost>"]);
        assert!(session.data.starts_with("From: alice <alice@localhost>\r\n"));
    }

    let bob = drain(&mut bob_sessions);
    for session in &bob {
        assert_eq!(session.find("AUTH"), [auth_plain("bob@localhost", "secret")]);
        assert_eq!(session.find("MAIL FROM"), ["MAIL FROM:<bob@localhost>"]);
        assert!(session.data.starts_with("From: bob <bob@localhost>\r\n"));
    }

    assert_eq!(alice.len() + bob.len(), 2);

    // once reconfigured, every send goes to the new server
    mailer
        .send("Third", "third", ["carol@localhost"])
        .await
        .unwrap();

    assert!(drain(&mut alice_sessions).is_empty());
    let bob = drain(&mut bob_sessions);
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].find("MAIL FROM"), ["MAIL FROM:<bob@localhost>"]);
}
