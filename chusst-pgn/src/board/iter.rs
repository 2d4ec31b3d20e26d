use super::Position;
use crate::pos;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Direction {
    pub row_inc: i8,
    pub col_inc: i8,
}

#[macro_export]
macro_rules! dir {
    ($row:expr, $col:expr) => {
        $crate::board::Direction {
            row_inc: $row,
            col_inc: $col,
        }
    };
}

pub fn try_move(position: &Position, direction: &Direction) -> Option<Position> {
    let row = position.rank as i8 + direction.row_inc;
    let col = position.file as i8 + direction.col_inc;

    if !(0..8).contains(&row) {
        return None;
    }

    if !(0..8).contains(&col) {
        return None;
    }

    match (usize::try_from(row), usize::try_from(col)) {
        (Ok(urow), Ok(ucol)) => Some(pos!(urow, ucol)),
        _ => None,
    }
}

// DirectionIter: iterator over the positions in a direction, excluding the origin

#[derive(Clone)]
pub struct DirectionIter {
    position: Option<Position>,
    direction: Direction,
}

impl Iterator for DirectionIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        self.position = self
            .position
            .and_then(|position| try_move(&position, &self.direction));
        self.position
    }
}

impl DirectionIter {
    pub fn new(position: Position, direction: Direction) -> Self {
        DirectionIter {
            position: Some(position),
            direction,
        }
    }
}
