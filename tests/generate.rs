use std::collections::BTreeMap;

use discovery::TargetGroup;
use pretty_assertions::assert_eq;
use sacloud_sd::config::{Config, HostnameMode, TargetRule, load_from_str};
use sacloud_sd::generate::{Error, Generator, generate};
use sacloud_sd::sacloud::{self, Interface, Inventory, Server, Zone};
use testify::temp::temp_dir;

/// Answers like the API, servers must have every queried tag.
struct Fixed(Vec<Server>);

#[async_trait::async_trait]
impl Inventory for Fixed {
    async fn find_servers(&self, zone: &str, tags: &[String]) -> Result<Vec<Server>, sacloud::Error> {
        Ok(self
            .0
            .iter()
            .filter(|server| server.zone.name == zone)
            .filter(|server| tags.iter().all(|tag| server.has_tag(tag)))
            .cloned()
            .collect())
    }
}

/// Matches tags ignoring case, as a looser inventory could.
struct CaseInsensitive(Vec<Server>);

#[async_trait::async_trait]
impl Inventory for CaseInsensitive {
    async fn find_servers(&self, _zone: &str, tags: &[String]) -> Result<Vec<Server>, sacloud::Error> {
        Ok(self
            .0
            .iter()
            .filter(|server| {
                tags.iter()
                    .all(|tag| server.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            })
            .cloned()
            .collect())
    }
}

struct Unavailable;

#[async_trait::async_trait]
impl Inventory for Unavailable {
    async fn find_servers(&self, _zone: &str, _tags: &[String]) -> Result<Vec<Server>, sacloud::Error> {
        Err(sacloud::Error::UnexpectedStatus {
            status: http::StatusCode::BAD_GATEWAY,
            body: String::new(),
        })
    }
}

fn server(id: u64, interfaces: &[(&str, &str)], tags: &[&str]) -> Server {
    Server {
        id,
        name: format!("server-{id}"),
        host_name: format!("host-{id}"),
        zone: Zone {
            name: "is1a".into(),
        },
        interfaces: interfaces
            .iter()
            .map(|(ip, user_ip)| Interface {
                ip_address: ip.to_string(),
                user_ip_address: user_ip.to_string(),
            })
            .collect(),
        tags: tags.iter().map(ToString::to_string).collect(),
    }
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn excluded_server_is_skipped() {
    let inventory = Fixed(vec![
        server(1, &[("10.0.0.1", "")], &["prod"]),
        server(2, &[("10.0.0.2", "")], &["prod", "staging"]),
    ]);
    let config = Config {
        zone: "is1a".into(),
        targets: vec![TargetRule {
            service: "web".into(),
            tags: vec!["prod".into()],
            ignore_tags: vec!["staging".into()],
            ports: vec![9100],
            interface_index: 0,
        }],
        ..Default::default()
    };

    let groups = generate(&config, &inventory).await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].targets, vec!["10.0.0.1:9100".to_string()]);
    assert_eq!(
        groups[0].labels,
        labels(&[
            ("__meta_sacloud_zone", "is1a"),
            ("__meta_sacloud_resource_id", "1"),
            ("__meta_sacloud_name", "server-1"),
            ("__meta_sacloud_ip", "10.0.0.1"),
            ("__meta_sacloud_instances_tags", ",prod,"),
            ("hostname", "server-1"),
            ("service", "web"),
        ])
    );
}

#[tokio::test]
async fn inventory_result_is_trusted() {
    let inventory = CaseInsensitive(vec![
        server(1, &[("10.0.0.1", "")], &["Prod"]),
        server(2, &[("10.0.0.2", "")], &["prod", "staging"]),
    ]);
    let config = Config {
        zone: "is1a".into(),
        targets: vec![TargetRule {
            service: "web".into(),
            tags: vec!["prod".into()],
            ignore_tags: vec!["staging".into()],
            ports: vec![9100],
            interface_index: 0,
        }],
        ..Default::default()
    };

    let groups = generate(&config, &inventory).await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].targets, vec!["10.0.0.1:9100".to_string()]);
    assert_eq!(groups[0].labels["__meta_sacloud_instances_tags"], ",Prod,");
}

#[tokio::test]
async fn from_config_file() {
    let inventory = Fixed(vec![
        // switch connected NIC, the user ip of interface 1 is preferred
        server(
            1,
            &[("153.120.0.1", ""), ("", "192.168.0.1")],
            &["monitoring", "db"],
        ),
        // NIC 1 is not configured
        server(2, &[("153.120.0.2", ""), ("", "")], &["monitoring", "db"]),
        // no NIC 1 at all
        server(3, &[("153.120.0.3", "")], &["monitoring", "db"]),
        server(4, &[("153.120.0.4", "")], &["monitoring", "web"]),
        server(5, &[("153.120.0.5", "")], &["db"]),
    ]);
    let config = load_from_str(
        r#"
sacloud_token: token
sacloud_token_secret: secret
sacloud_zone: is1a
base_tags: [monitoring]
host_name_type: modify_disk
targets:
  - service: mysqld
    tags: [db]
    ports: [9104, 9100]
    interface_index: 1
  - service: node
    ignore_tags: [db]
    ports: [9100]
"#,
    )
    .unwrap();
    assert_eq!(config.hostname_mode, HostnameMode::HostName);

    let groups = generate(&config, &inventory).await.unwrap();
    let got = groups
        .iter()
        .map(|group| {
            (
                group.labels["service"].as_str(),
                group.labels["hostname"].as_str(),
                group.targets.clone(),
            )
        })
        .collect::<Vec<_>>();

    assert_eq!(
        got,
        vec![
            (
                "mysqld",
                "host-1",
                vec!["192.168.0.1:9104".to_string(), "192.168.0.1:9100".to_string()]
            ),
            (
                "mysqld",
                "host-2",
                vec!["153.120.0.2:9104".to_string(), "153.120.0.2:9100".to_string()]
            ),
            ("node", "host-4", vec!["153.120.0.4:9100".to_string()]),
        ]
    );
}

#[tokio::test]
async fn write_discovery_file() {
    let dir = temp_dir();
    let output = dir.join("sd").join("generated.yml");
    let config = Config {
        zone: "is1a".into(),
        targets: vec![TargetRule {
            service: "node".into(),
            ports: vec![9100],
            ..Default::default()
        }],
        ..Default::default()
    };
    let generator = Generator::new(
        config,
        Fixed(vec![server(7, &[("10.0.0.7", "")], &["a b", "c-d"])]),
        output.clone(),
    );

    assert_eq!(generator.run_once().await.unwrap(), 1);

    let groups = discovery::read(&output).unwrap();
    assert_eq!(
        groups,
        vec![TargetGroup {
            targets: vec!["10.0.0.7:9100".to_string()],
            labels: labels(&[
                ("__meta_sacloud_zone", "is1a"),
                ("__meta_sacloud_resource_id", "7"),
                ("__meta_sacloud_name", "server-7"),
                ("__meta_sacloud_ip", "10.0.0.7"),
                ("__meta_sacloud_instances_tags", ",a_b,c_d,"),
                ("hostname", "server-7"),
                ("service", "node"),
            ]),
            source: format!("{}:0", output.display()),
        }]
    );

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn failure_keeps_previous_file() {
    let dir = temp_dir();
    let output = dir.join("generated.yml");
    std::fs::write(&output, "- targets: [\"10.0.0.1:9100\"]\n").unwrap();

    let config = Config {
        zone: "is1a".into(),
        targets: vec![TargetRule {
            service: "node".into(),
            ports: vec![9100],
            ..Default::default()
        }],
        ..Default::default()
    };
    let generator = Generator::new(config, Unavailable, output.clone());

    let err = generator.run_once().await.unwrap_err();
    assert!(matches!(err, Error::Inventory { .. }));
    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "- targets: [\"10.0.0.1:9100\"]\n"
    );

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn empty_targets_write_empty_list() {
    let dir = temp_dir();
    let output = dir.join("generated.yml");
    let generator = Generator::new(Config::default(), Unavailable, output.clone());

    assert_eq!(generator.run_once().await.unwrap(), 0);
    assert!(discovery::read(&output).unwrap().is_empty());

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn write_failure() {
    let dir = temp_dir();
    let blocker = dir.join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();

    let generator = Generator::new(
        Config::default(),
        Fixed(vec![]),
        blocker.join("generated.yml"),
    );

    let err = generator.run_once().await.unwrap_err();
    assert!(matches!(err, Error::Write(_)));
    assert_eq!(err.exit_code(), exitcode::IOERR);

    std::fs::remove_dir_all(dir).unwrap();
}
