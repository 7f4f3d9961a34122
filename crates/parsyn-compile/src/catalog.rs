//! Named device topologies.
//!
//! Fixed devices are listed by name; parametric families use a `-N`
//! suffix: `full-N`, `line-N` and `star-N`.

use crate::error::{CompileError, CompileResult};
use crate::topology::Topology;

struct Device {
    name: &'static str,
    num_nodes: usize,
    edges: &'static [(usize, usize)],
}

const DEVICES: &[Device] = &[
    Device {
        name: "9q-square",
        num_nodes: 9,
        edges: &[
            (0, 1),
            (0, 5),
            (1, 2),
            (1, 4),
            (2, 3),
            (3, 4),
            (3, 8),
            (4, 5),
            (4, 7),
            (5, 6),
            (6, 7),
            (7, 8),
        ],
    },
    Device {
        name: "5q-line",
        num_nodes: 5,
        edges: &[(0, 1), (0, 2), (1, 2), (2, 3), (3, 4)],
    },
    Device {
        name: "ibm_qx2",
        num_nodes: 5,
        edges: &[(0, 1), (0, 2), (1, 2), (2, 3), (2, 4), (3, 4)],
    },
    Device {
        name: "ibm_qx3",
        num_nodes: 16,
        edges: &[
            (0, 1),
            (0, 5),
            (1, 2),
            (1, 4),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 7),
            (6, 15),
            (7, 8),
            (7, 14),
            (8, 9),
            (8, 13),
            (9, 10),
            (10, 11),
            (11, 12),
            (12, 13),
            (13, 14),
            (14, 15),
        ],
    },
    // Coupling directions are ignored, so QX4 shares QX2's graph.
    Device {
        name: "ibm_qx4",
        num_nodes: 5,
        edges: &[(0, 1), (0, 2), (1, 2), (2, 3), (2, 4), (3, 4)],
    },
    Device {
        name: "ibm_qx5",
        num_nodes: 16,
        edges: &[
            (0, 1),
            (0, 15),
            (1, 2),
            (1, 14),
            (2, 3),
            (2, 13),
            (3, 4),
            (3, 12),
            (4, 5),
            (4, 11),
            (5, 6),
            (5, 10),
            (6, 7),
            (6, 9),
            (7, 8),
            (8, 9),
            (9, 10),
            (10, 11),
            (11, 12),
            (12, 13),
            (13, 14),
            (14, 15),
        ],
    },
    Device {
        name: "rigetti_16q_aspen",
        num_nodes: 16,
        edges: &[
            (0, 1),
            (0, 7),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 7),
            (6, 9),
            (7, 8),
            (8, 9),
            (8, 15),
            (9, 10),
            (10, 11),
            (11, 12),
            (12, 13),
            (13, 14),
            (14, 15),
        ],
    },
    Device {
        name: "rigetti_8q_agave",
        num_nodes: 8,
        edges: &[
            (0, 1),
            (0, 7),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 7),
        ],
    },
];

/// Look up a topology by name.
pub fn named(name: &str) -> CompileResult<Topology> {
    if let Some(device) = DEVICES.iter().find(|d| d.name == name) {
        return Topology::from_edges(device.num_nodes, device.edges);
    }

    let family = |prefix: &str| -> Option<usize> {
        name.strip_prefix(prefix)
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n > 0)
    };
    if let Some(n) = family("full-") {
        return Ok(Topology::full(n));
    }
    if let Some(n) = family("line-") {
        return Ok(Topology::linear(n));
    }
    if let Some(n) = family("star-") {
        return Ok(Topology::star(n));
    }

    Err(CompileError::UnknownTopology(name.into()))
}

/// Names accepted by [`named`]; parametric families shown as `<family>-N`.
pub fn names() -> Vec<&'static str> {
    DEVICES
        .iter()
        .map(|d| d.name)
        .chain(["full-N", "line-N", "star-N"])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_device_builds_connected() {
        for device in DEVICES {
            let t = named(device.name).unwrap();
            assert_eq!(t.num_nodes(), device.num_nodes, "{}", device.name);
            assert_eq!(t.edges().len(), device.edges.len(), "{}", device.name);
            assert!(t.is_connected(), "{} is disconnected", device.name);
        }
    }

    #[test]
    fn test_every_device_supports_elimination() {
        for device in DEVICES {
            assert!(
                named(device.name).unwrap().supports_elimination(),
                "{} cannot be reduced",
                device.name
            );
        }
    }

    #[test]
    fn test_aspen_reduces_random_maps() {
        use crate::eliminate::SteinerGauss;
        use crate::parity::ParityMap;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let topology = named("rigetti_16q_aspen").unwrap();
        assert!(topology.is_adjacent(7, 8));
        assert!(topology.is_adjacent(6, 9));

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let map = ParityMap::random(16, 30, &mut rng);
            let mut m = map.matrix().clone();
            let rank = SteinerGauss::new(&topology)
                .full_reduce(true)
                .reduce(&mut m, &mut [])
                .unwrap();
            assert_eq!(rank, 16);
            assert!(m.is_identity());
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(named("line-7").unwrap().edges().len(), 6);
        assert_eq!(named("full-4").unwrap().edges().len(), 6);
        assert_eq!(named("star-5").unwrap().neighbors(0).count(), 4);
        assert!(named("line-0").is_err());
        assert!(named("line-x").is_err());
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            named("ibm_qx9"),
            Err(CompileError::UnknownTopology(name)) if name == "ibm_qx9"
        ));
    }

    #[test]
    fn test_names_lists_devices_and_families() {
        let names = names();
        assert!(names.contains(&"rigetti_8q_agave"));
        assert!(names.contains(&"line-N"));
        assert_eq!(names.len(), DEVICES.len() + 3);
    }
}
