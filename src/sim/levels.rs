//! Bundled board layouts

/// The standard 25x15 board. Three pursuers start behind the central pen
/// gate, with ten pills in the side pockets; the two crossing rows run
/// all the way to the edge.
pub const LEVEL1: &str = "
+-----------------------+
|oooooo*ooooooooo*oooooo|
oo+---------o---------+oo
|o|o*ooooooooooooooo*o|o|
|o+----o+-------+o----+o|
|ooooooooooooooooooooooo|
|o+----o|o+---+o|o----+o|
|o|o*ooo|o|xxx|o|ooo*o|o|
|o+o----+o+-=-+o+----o+o|
|ooooooo|ooo@ooo|ooooooo|
|o+----o+o-----o+o----+o|
|o|o*ooooooooooooooo*o|o|
oo+---------o---------+oo
|oooooo*ooooooooo*oooooo|
+-----------------------+
";
