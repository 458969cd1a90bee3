//! Coordinate Frame Tests - Conversion round trips and compass geometry.

use crate::constants::FRAME_CENTER;
use crate::coords::{CacheLoc, Dir8, Frame, WorldLoc};

#[test]
fn world_cache_round_trip() {
    for home in [WorldLoc::new(0, 0), WorldLoc::new(317, 29), WorldLoc::new(-40, 512)] {
        let frame = Frame::new(home);
        for dx in -100..=100 {
            let w = WorldLoc::new(home.x + dx, home.y - dx * 3 / 2);
            assert_eq!(frame.cache_to_world(frame.world_to_cache(w)), w);
        }
        let c = CacheLoc::new(17, 203);
        assert_eq!(frame.world_to_cache(frame.cache_to_world(c)), c);
    }
}

#[test]
fn home_maps_to_frame_center() {
    let home = WorldLoc::new(1234, 567);
    let frame = Frame::new(home);
    assert_eq!(frame.world_to_cache(home), CacheLoc::new(FRAME_CENTER, FRAME_CENTER));
}

#[test]
fn compass_rotation_and_opposites() {
    assert_eq!(Dir8::North.rotate_right(), Dir8::NorthEast);
    assert_eq!(Dir8::North.rotate_left(), Dir8::NorthWest);
    assert_eq!(Dir8::West.opposite(), Dir8::East);
    for dir in Dir8::ALL {
        assert_eq!(dir.rotate_left().rotate_right(), dir);
        assert_eq!(dir.opposite().opposite(), dir);
        let (dx, dy) = dir.delta();
        let (ox, oy) = dir.opposite().delta();
        assert_eq!((dx + ox, dy + oy), (0, 0));
        assert_eq!(dir.is_diagonal(), dx != 0 && dy != 0);
    }
}

#[test]
fn towards_picks_the_containing_sector() {
    assert_eq!(Dir8::towards(0, -5), Dir8::North);
    assert_eq!(Dir8::towards(0, 5), Dir8::South);
    assert_eq!(Dir8::towards(10, 0), Dir8::East);
    assert_eq!(Dir8::towards(-10, -1), Dir8::West);
    assert_eq!(Dir8::towards(7, 7), Dir8::SouthEast);
    assert_eq!(Dir8::towards(-7, -7), Dir8::NorthWest);
    // Just past the 22.5 degree boundary tips into the diagonal sector.
    assert_eq!(Dir8::towards(10, 5), Dir8::SouthEast);
    assert_eq!(Dir8::towards(10, 3), Dir8::East);
    // Unit deltas map back to their own direction.
    for dir in Dir8::ALL {
        let (dx, dy) = dir.delta();
        assert_eq!(Dir8::towards(dx, dy), dir);
    }
}
