use std::fmt;

use serde::Serialize;

/// A query node of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub id: i64,
    pub ip: String,
    pub port: i32,
}

/// A storage engine registered with the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageEngineInfo {
    pub id: i64,
    pub ip: String,
    pub port: i32,
    pub engine_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaStorageInfo {
    pub ip: String,
    pub port: i32,
    pub storage_type: String,
}

/// Cluster topology reported by `SHOW CLUSTER INFO`.
///
/// A cluster keeps its metadata either in external meta storages or in a
/// local directory; when `local_meta_storage` is set the external list is
/// not printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    pub nodes: Vec<NodeInfo>,
    pub storage_engines: Vec<StorageEngineInfo>,
    pub meta_storages: Vec<MetaStorageInfo>,
    pub local_meta_storage: Option<String>,
}

impl ClusterInfo {
    #[must_use]
    pub const fn uses_local_meta_storage(&self) -> bool {
        self.local_meta_storage.is_some()
    }
}

impl fmt::Display for ClusterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Iginx info:")?;
        for node in &self.nodes {
            writeln!(f, "Id: {}, Ip: {}, Port: {}", node.id, node.ip, node.port)?;
        }
        writeln!(f, "Storage engine info:")?;
        for engine in &self.storage_engines {
            writeln!(
                f,
                "Id: {}, Ip: {}, Port: {}, Type: {}",
                engine.id, engine.ip, engine.port, engine.engine_type
            )?;
        }
        if let Some(path) = &self.local_meta_storage {
            writeln!(f, "Local meta storage info:")?;
            writeln!(f, "{path}")
        } else {
            writeln!(f, "Meta storage info:")?;
            for meta in &self.meta_storages {
                writeln!(
                    f,
                    "Ip: {}, Port: {}, Type: {}",
                    meta.ip, meta.port, meta.storage_type
                )?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> ClusterInfo {
        ClusterInfo {
            nodes: vec![NodeInfo {
                id: 0,
                ip: "127.0.0.1".to_owned(),
                port: 6888,
            }],
            storage_engines: vec![StorageEngineInfo {
                id: 1,
                ip: "127.0.0.1".to_owned(),
                port: 6667,
                engine_type: "iotdb12".to_owned(),
            }],
            meta_storages: vec![MetaStorageInfo {
                ip: "127.0.0.1".to_owned(),
                port: 2181,
                storage_type: "zookeeper".to_owned(),
            }],
            local_meta_storage: None,
        }
    }

    #[test]
    fn prints_external_meta_storages() {
        let info = cluster();
        assert!(!info.uses_local_meta_storage());
        assert_eq!(
            info.to_string(),
            "Iginx info:\n\
             Id: 0, Ip: 127.0.0.1, Port: 6888\n\
             Storage engine info:\n\
             Id: 1, Ip: 127.0.0.1, Port: 6667, Type: iotdb12\n\
             Meta storage info:\n\
             Ip: 127.0.0.1, Port: 2181, Type: zookeeper\n"
        );
    }

    #[test]
    fn local_meta_storage_hides_the_external_list() {
        let info = ClusterInfo {
            local_meta_storage: Some("/var/lib/meta".to_owned()),
            ..cluster()
        };
        assert!(info.uses_local_meta_storage());
        assert_eq!(
            info.to_string(),
            "Iginx info:\n\
             Id: 0, Ip: 127.0.0.1, Port: 6888\n\
             Storage engine info:\n\
             Id: 1, Ip: 127.0.0.1, Port: 6667, Type: iotdb12\n\
             Local meta storage info:\n\
             /var/lib/meta\n"
        );
    }
}
