use crate::constants::ROOM_ID_SEPARATOR;
use crate::types::{RoomId, UserId};

/// Derive the shared room id for two users.
///
/// The two ids are ordered lexicographically before being joined, so the
/// result does not depend on which partner computes it.
pub fn derive_room_id(a: &UserId, b: &UserId) -> RoomId {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    RoomId(format!("{first}{ROOM_ID_SEPARATOR}{second}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric() {
        let pairs = [
            ("alice", "bob"),
            ("uid-9", "uid-10"),
            ("same", "same"),
            ("", "x"),
            ("Zed", "adam"),
        ];
        for (a, b) in pairs {
            let (a, b) = (UserId::from(a), UserId::from(b));
            assert_eq!(derive_room_id(&a, &b), derive_room_id(&b, &a));
        }
    }

    #[test]
    fn sorted_concatenation() {
        let room = derive_room_id(&UserId::from("zoe"), &UserId::from("adam"));
        assert_eq!(room.as_str(), "adam-zoe");
    }

    #[test]
    fn distinct_pairs_distinct_rooms() {
        let ab = derive_room_id(&UserId::from("a"), &UserId::from("b"));
        let ac = derive_room_id(&UserId::from("a"), &UserId::from("c"));
        assert_ne!(ab, ac);
    }
}
