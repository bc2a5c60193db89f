//! Links the keyframes of each bone into a chain.
//!
//! Chains follow file order. Keys are not sorted by frame number, even when a
//! bone's keys are stored out of chronological order.

use std::collections::HashMap;
use crate::vmd::document::MotionKeyframe;

pub fn index_channels(motions: &mut [MotionKeyframe]) {
    let mut last_seen: HashMap<String, usize> = HashMap::new();
    for i in 0..motions.len() {
        let name = motions[i].bone_name.clone();
        if let Some(j) = last_seen.insert(name, i) {
            motions[j].link.next = Some(i);
            motions[i].link.previous = Some(j);
        }
    }
}

/// The indices of each bone's keyframes, following the links from each chain
/// head. Bones appear in the order they are first seen.
pub fn channels(motions: &[MotionKeyframe]) -> Vec<Vec<usize>> {
    let mut res = vec![];
    for (head, key) in motions.iter().enumerate() {
        if key.link.previous.is_some() {
            continue;
        }
        let mut chain = vec![head];
        let mut cur = key.link.next;
        while let Some(i) = cur {
            chain.push(i);
            cur = motions[i].link.next;
        }
        res.push(chain);
    }
    res
}


#[cfg(test)]
fn keys(names: &[(&str, u32)]) -> Vec<MotionKeyframe> {
    use cgmath::{Quaternion, Vector3};
    use crate::vmd::document::ChannelLink;
    use crate::vmd::interpolation::MotionInterpolation;
    use crate::vmd::rotation::EulerAngles;

    let q = Quaternion::new(1.0, 0.0, 0.0, 0.0);
    names.iter().map(|&(name, frame_no)| MotionKeyframe {
        bone_name: name.to_string(),
        frame_no,
        location: Vector3::new(0.0, 0.0, 0.0),
        quaternion: q,
        euler: EulerAngles::default(),
        quaternion_left_hand: q,
        quaternion_right_hand: q,
        interpolation: MotionInterpolation::default(),
        link: ChannelLink::default(),
    }).collect()
}

#[test]
fn test_links() {
    let mut motions = keys(&[("A", 0), ("B", 0), ("A", 10), ("A", 20)]);
    index_channels(&mut motions);

    let links: Vec<_> = motions.iter()
        .map(|m| (m.link.previous, m.link.next))
        .collect();
    assert_eq!(links, vec![
        (None, Some(2)),
        (None, None),
        (Some(0), Some(3)),
        (Some(2), None),
    ]);
    assert_eq!(channels(&motions), vec![vec![0, 2, 3], vec![1]]);
}

#[test]
fn test_file_order_is_kept() {
    let mut motions = keys(&[("A", 30), ("B", 5), ("A", 10), ("B", 0), ("A", 20)]);
    index_channels(&mut motions);
    assert_eq!(channels(&motions), vec![vec![0, 2, 4], vec![1, 3]]);
    assert_eq!(motions[3].link.previous, Some(1));
}

#[test]
fn test_empty() {
    let mut motions = keys(&[]);
    index_channels(&mut motions);
    assert!(channels(&motions).is_empty());
}
