//! End-to-end tests driving real servers over loopback TCP.
//!
//! Every test gets its own control port, passive port range and root
//! directory so they can run in parallel.

mod common;

use common::{Client, open_data, read_data_to_end, spawn_server, wait_for_status};
use pretty_assertions::assert_eq;
use slotftp::ServerStatus;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;

#[tokio::test(flavor = "multi_thread")]
async fn login_happy_path() {
    let ts = spawn_server(2121, 56000, 1).await;
    let mut client = Client::connect(ts.port).await;
    client.send("USER user").await;
    assert_eq!(client.read_line().await, "331 OK. Password required\r\n");
    client.send("PASS pass").await;
    assert_eq!(client.read_line().await, "230 OK, logged in as user\r\n");
    client.send("QUIT").await;
    assert_eq!(client.read_line().await, "221 Goodbye\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_credentials_are_rejected() {
    let ts = spawn_server(2122, 56025, 1).await;
    let mut client = Client::connect(ts.port).await;
    client.send("USER nosuchuser").await;
    client.expect("530 ").await;
    client.send("USER user").await;
    client.expect("331 ").await;
    client.send("PASS wrong").await;
    assert_eq!(client.read_line().await, "530 Password not correct\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn commands_before_login_get_silence() {
    let ts = spawn_server(2123, 56050, 1).await;
    let mut client = Client::connect(ts.port).await;
    // Neither of these may produce a reply before login; the next line on
    // the wire must be the QUIT response.
    client.send("PWD").await;
    client.send("NOOP").await;
    client.send("QUIT").await;
    assert_eq!(client.read_line().await, "221 Goodbye\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn passive_listing_streams_the_directory() {
    let ts = spawn_server(2124, 56075, 1).await;
    std::fs::write(ts.root.join("foo.txt"), b"hello").unwrap();
    std::fs::write(ts.root.join(".hidden"), b"x").unwrap();
    std::fs::create_dir(ts.root.join("sub")).unwrap();

    let mut client = Client::connect(ts.port).await;
    client.login().await;

    let pasv = client.expect_pasv().await;
    let data = open_data(&pasv).await;
    client.send("LIST").await;
    client.expect("150 ").await;
    let listing = String::from_utf8(read_data_to_end(data).await).unwrap();
    client.expect("226 ").await;

    assert!(listing.contains("+r,s5,\tfoo.txt\r\n"), "unexpected listing: {listing:?}");
    assert!(listing.contains("+/,\tsub\r\n"), "unexpected listing: {listing:?}");
    assert!(!listing.contains(".hidden"), "hidden entry leaked: {listing:?}");

    // NLST over a fresh data connection: names only.
    let pasv = client.expect_pasv().await;
    let data = open_data(&pasv).await;
    client.send("NLST").await;
    client.expect("150 ").await;
    let names = String::from_utf8(read_data_to_end(data).await).unwrap();
    client.expect("226 ").await;
    assert!(names.contains("foo.txt\r\n") && names.contains("sub\r\n"), "unexpected names: {names:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn machine_listing_counts_matches() {
    let ts = spawn_server(2132, 56275, 1).await;
    std::fs::write(ts.root.join("a.bin"), vec![0u8; 321]).unwrap();
    std::fs::create_dir(ts.root.join("d")).unwrap();

    let mut client = Client::connect(ts.port).await;
    client.login().await;
    let pasv = client.expect_pasv().await;
    let data = open_data(&pasv).await;
    client.send("MLSD").await;
    client.expect("150 ").await;
    let listing = String::from_utf8(read_data_to_end(data).await).unwrap();
    let trailer = client.expect("226 ").await;

    assert!(listing.contains("Type=file;Size=321;"), "unexpected listing: {listing:?}");
    assert!(listing.contains(" a.bin\r\n"), "unexpected listing: {listing:?}");
    assert!(listing.contains("Type=dir;Size=0;"), "unexpected listing: {listing:?}");
    assert_eq!(trailer, "226 Options: -a -l, 2 matches total\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn stor_coalesces_and_retr_round_trips() {
    let ts = spawn_server(2125, 56100, 1).await;
    let payload: Vec<u8> = (0u32..2600).map(|i| (i % 251) as u8).collect();

    let mut client = Client::connect(ts.port).await;
    client.login().await;

    let pasv = client.expect_pasv().await;
    let mut data = open_data(&pasv).await;
    client.send("STOR up.bin").await;
    client.expect("150 ").await;
    // Segments as a slow sender would produce them.
    for chunk in [&payload[..900], &payload[900..1700], &payload[1700..]] {
        data.write_all(chunk).await.unwrap();
        data.flush().await.unwrap();
        sleep(Duration::from_millis(30)).await;
    }
    data.shutdown().await.unwrap();
    drop(data);
    client.expect("226 ").await;
    assert_eq!(std::fs::read(ts.root.join("up.bin")).unwrap(), payload);

    // And back down again.
    let pasv = client.expect_pasv().await;
    let data = open_data(&pasv).await;
    client.send("RETR up.bin").await;
    let preliminary = client.expect("150 ").await;
    assert!(preliminary.contains("2600 bytes"), "unexpected 150: {preliminary:?}");
    let downloaded = read_data_to_end(data).await;
    client.expect("226 ").await;
    assert_eq!(downloaded, payload);

    // Transfers must not move the working directory.
    client.send("PWD").await;
    assert_eq!(client.read_line().await, "257 \"/\" is your current directory\r\n");

    let stats = ts.server.stats();
    assert_eq!(stats.files_received, 1);
    assert_eq!(stats.files_sent, 1);
    assert_eq!(stats.files_receive_failed, 0);
    assert_eq!(stats.files_send_failed, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn filesystem_commands_keep_the_working_directory() {
    let ts = spawn_server(2126, 56125, 1).await;
    std::fs::write(ts.root.join("keep.txt"), b"0123456789").unwrap();

    let mut client = Client::connect(ts.port).await;
    client.login().await;

    client.send("MKD store").await;
    assert_eq!(client.read_line().await, "257 \"store\" created\r\n");
    client.send("MKD store").await;
    client.expect("521 ").await;

    client.send("CWD store").await;
    client.expect("250 ").await;
    client.send("PWD").await;
    assert_eq!(client.read_line().await, "257 \"/store\" is your current directory\r\n");

    // Path-staging commands must leave the working directory alone.
    client.send("SIZE /keep.txt").await;
    assert_eq!(client.read_line().await, "213 10\r\n");
    client.send("MDTM /keep.txt").await;
    let mdtm = client.expect("213 ").await;
    assert_eq!(mdtm.trim_end().len(), "213 ".len() + 14);
    client.send("PWD").await;
    assert_eq!(client.read_line().await, "257 \"/store\" is your current directory\r\n");

    client.send("CDUP").await;
    client.expect("250 ").await;
    client.send("PWD").await;
    assert_eq!(client.read_line().await, "257 \"/\" is your current directory\r\n");

    client.send("RNFR keep.txt").await;
    client.expect("350 ").await;
    client.send("RNTO kept.txt").await;
    client.expect("250 ").await;
    assert!(ts.root.join("kept.txt").exists());
    // The staged source was consumed.
    client.send("RNTO again.txt").await;
    client.expect("503 ").await;

    client.send("DELE kept.txt").await;
    client.expect("250 ").await;
    client.send("DELE kept.txt").await;
    client.expect("550 ").await;

    client.send("RMD store").await;
    client.expect("250 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn protocol_odds_and_ends() {
    let ts = spawn_server(2129, 56200, 1).await;
    let mut client = Client::connect(ts.port).await;

    // AUTH is answered even before login.
    client.send("AUTH TLS").await;
    assert_eq!(client.read_line().await, "504 Not available\r\n");

    client.login().await;

    client.send("SYST").await;
    assert_eq!(client.read_line().await, "215 FTP Server, V1.0\r\n");
    client.send("NOOP").await;
    assert_eq!(client.read_line().await, "200 Zzz...\r\n");
    client.send("MODE S").await;
    client.expect("200 ").await;
    client.send("MODE B").await;
    client.expect("504 ").await;
    client.send("STRU F").await;
    client.expect("200 ").await;
    client.send("STRU R").await;
    client.expect("504 ").await;
    client.send("TYPE I").await;
    client.expect("200 ").await;
    client.send("TYPE X").await;
    client.expect("504 ").await;
    client.send("STAT").await;
    client.expect("221 ").await;
    client.send("SITE FREE").await;
    client.expect("211 ").await;
    client.send("SITE CHMOD 777 x").await;
    client.expect("550 ").await;
    client.send("BOGUS").await;
    assert_eq!(client.read_line().await, "500 Unknown command\r\n");

    client.send("FEAT").await;
    let feat = client.read_until_final("211").await;
    assert_eq!(feat.first().unwrap(), "211-Extensions supported:\r\n");
    assert!(feat.iter().any(|l| l == " MLSD\r\n"), "unexpected FEAT: {feat:?}");
    assert!(feat.iter().any(|l| l == " SITE FREE\r\n"), "unexpected FEAT: {feat:?}");
    assert_eq!(feat.last().unwrap(), "211 End.\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn active_mode_dials_the_client_back() {
    let ts = spawn_server(2130, 56225, 1).await;
    std::fs::write(ts.root.join("seen.txt"), b"ok").unwrap();

    let mut client = Client::connect(ts.port).await;
    client.login().await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    client.send(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff)).await;
    client.expect("200 ").await;

    client.send("LIST").await;
    let (data, _) = listener.accept().await.unwrap();
    client.expect("150 ").await;
    let listing = String::from_utf8(read_data_to_end(data).await).unwrap();
    client.expect("226 ").await;
    assert!(listing.contains("seen.txt"), "unexpected listing: {listing:?}");

    client.send("PORT 1,2,3").await;
    client.expect("501 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn slot_exhaustion_turns_the_next_client_away() {
    let ts = spawn_server(2127, 56150, 1).await;

    let mut first = Client::connect(ts.port).await;
    first.login().await;

    let mut second = Client::connect_raw(ts.port).await;
    assert_eq!(second.read_line().await, "421 No more connections allowed\r\n");
    second.expect_eof().await;

    // The first session is unaffected.
    first.send("NOOP").await;
    first.expect("200 ").await;

    assert!(ts.server.errors().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn graceful_stop_and_restart() {
    let ts = spawn_server(2128, 56175, 2).await;

    let mut client = Client::connect(ts.port).await;
    client.login().await;

    ts.server.stop();
    wait_for_status(&ts.server, ServerStatus::Idle).await;
    assert!(ts.server.errors().is_empty());
    // The idle session observed the stop flag and was torn down.
    client.expect_eof().await;

    let stats = ts.server.stats();
    assert_eq!(stats.clients_connected, 1);
    assert_eq!(stats.clients_disconnected, 1);
    assert_eq!(stats.clients_active, 0);
    assert_eq!(stats.clients_max, 2);

    // A stopped server starts again on the same port.
    ts.server.start();
    wait_for_status(&ts.server, ServerStatus::Running).await;
    let mut again = Client::connect(ts.port).await;
    again.login().await;
}

impl Client {
    /// Sends PASV and returns the 227 reply.
    async fn expect_pasv(&mut self) -> String {
        self.send("PASV").await;
        self.expect("227 ").await
    }
}
