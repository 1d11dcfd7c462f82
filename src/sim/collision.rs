//! Collision detection between players and obstacles
//!
//! Positions are snapped to whole pixels and the two masks are compared
//! pixel by pixel. Bounding boxes are never used as a shortcut for a hit.

use super::mask::Mask;
use super::spawner::ObstacleSpawner;
use super::state::{Obstacle, Player};

/// Top-left pixel of a player's mask (mid-bottom anchor)
pub fn player_origin(player: &Player, mask: &Mask) -> (i32, i32) {
    (
        player.position.x.round() as i32 - mask.width() as i32 / 2,
        player.position.y.round() as i32 - mask.height() as i32,
    )
}

/// Top-left pixel of an obstacle's mask (left-bottom anchor)
pub fn obstacle_origin(obstacle: &Obstacle, mask: &Mask) -> (i32, i32) {
    (
        obstacle.x.round() as i32,
        obstacle.y.round() as i32 - mask.height() as i32,
    )
}

/// Whether the player's mask touches the obstacle's mask
pub fn player_hits_obstacle(
    player: &Player,
    player_mask: &Mask,
    obstacle: &Obstacle,
    obstacle_mask: &Mask,
) -> bool {
    let (px, py) = player_origin(player, player_mask);
    let (ox, oy) = obstacle_origin(obstacle, obstacle_mask);
    player_mask.overlaps(obstacle_mask, (ox - px, oy - py))
}

/// Id of the first live obstacle the player touches, in spawn order
pub fn first_collision(player: &Player, player_mask: &Mask, spawner: &ObstacleSpawner) -> Option<u32> {
    spawner
        .obstacles()
        .iter()
        .find(|o| player_hits_obstacle(player, player_mask, o, spawner.mask(o.kind)))
        .map(|o| o.id)
}
