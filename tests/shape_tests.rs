//! Shape geometry: spawning, movement, rotation tables, wall kicks and cell
//! removal.

use falling_blocks::game::test_helpers::*;
use falling_blocks::palette::DEFAULT_PALETTE;
use falling_blocks::{BoardSize, LockedCells, Orientation, Shape, ShapeId, ShapeKind};

fn spawn(kind: ShapeKind, rotations: usize) -> Shape {
    Shape::spawn(ShapeId(0), kind, board(), DEFAULT_PALETTE[0], rotations)
}

fn shape(kind: ShapeKind, orientation: Orientation, cells: Vec<usize>) -> Shape {
    Shape::with_cells(ShapeId(0), kind, orientation, board(), cells, DEFAULT_PALETTE[0])
}

fn empty() -> LockedCells {
    LockedCells::empty(board())
}

fn locked_at(cells: Vec<usize>) -> LockedCells {
    LockedCells::of_locked(board(), &[locked_shape(99, cells)])
}

// ============================================================================
// Spawn Tests
// ============================================================================

mod spawning {
    use super::*;

    #[test]
    fn each_kind_spawns_top_center() {
        let expected = [
            (ShapeKind::I, vec![3, 4, 5, 6]),
            (ShapeKind::O, vec![3, 4, 13, 14]),
            (ShapeKind::T, vec![3, 4, 5, 14]),
            (ShapeKind::S, vec![4, 5, 13, 14]),
            (ShapeKind::Z, vec![3, 4, 14, 15]),
            (ShapeKind::L, vec![3, 4, 5, 13]),
            (ShapeKind::J, vec![3, 4, 5, 15]),
        ];

        for (kind, cells) in expected {
            let shape = spawn(kind, 0);
            assert_eq!(shape.cells(), cells.as_slice(), "{kind:?}");
            assert_eq!(shape.orientation(), kind.spawn_orientation());
            assert!(!shape.is_locked());
        }
    }

    #[test]
    fn spawn_rotations_are_lifted_to_the_top_row() {
        let once = spawn(ShapeKind::T, 1);
        assert_eq!(once.orientation(), Orientation::Left);
        assert_eq!(once.cells(), &[4, 13, 14, 24]);

        let twice = spawn(ShapeKind::T, 2);
        assert_eq!(twice.orientation(), Orientation::Up);
        assert_eq!(twice.cells(), &[4, 13, 14, 15]);

        let line = spawn(ShapeKind::I, 1);
        assert_eq!(line.orientation(), Orientation::Vertical);
        assert_eq!(line.cells(), &[4, 14, 24, 34]);
    }

    #[test]
    fn every_kind_has_four_cells_in_every_spawn_rotation() {
        for kind in ShapeKind::ALL {
            for rotations in 0..=3 {
                let shape = spawn(kind, rotations);
                assert_eq!(shape.cells().len(), 4);
                assert_eq!(board().row_of(shape.cells()[0]), 0, "{kind:?} x{rotations}");
            }
        }
    }

    #[test]
    fn spawns_on_the_smallest_board() {
        let board = BoardSize::new(4, 4);
        for kind in ShapeKind::ALL {
            for rotations in 0..=2 {
                let shape = Shape::spawn(ShapeId(1), kind, board, DEFAULT_PALETTE[0], rotations);
                assert!(shape.cells().iter().all(|&cell| cell < board.cell_count()));
            }
        }
    }

    #[test]
    #[should_panic]
    fn spawn_rejects_tiny_board() {
        Shape::spawn(ShapeId(0), ShapeKind::O, BoardSize::new(3, 10), DEFAULT_PALETTE[0], 0);
    }
}

// ============================================================================
// Piece Movement Tests
// ============================================================================

mod movement {
    use super::*;

    #[test]
    fn moves_left_and_right() {
        let mut square = spawn(ShapeKind::O, 0);

        assert!(square.move_left(&empty()));
        assert_eq!(square.cells(), &[2, 3, 12, 13]);

        assert!(square.move_right(&empty()));
        assert!(square.move_right(&empty()));
        assert_eq!(square.cells(), &[4, 5, 14, 15]);
    }

    #[test]
    fn cannot_wrap_through_left_wall() {
        let mut square = square_at(0, 5, 0);

        assert!(!square.move_left(&empty()));
        assert_eq!(square.cells(), &[50, 51, 60, 61]);
    }

    #[test]
    fn cannot_wrap_through_right_wall() {
        let mut square = square_at(0, 5, 8);

        assert!(!square.move_right(&empty()));
        assert_eq!(square.cells(), &[58, 59, 68, 69]);
    }

    #[test]
    fn sideways_blocked_by_locked_cell() {
        let mut square = square_at(0, 5, 4);

        assert!(!square.move_right(&locked_at(vec![56])));
        assert_eq!(square.cells(), &[54, 55, 64, 65]);
        assert!(!square.is_locked());
    }

    #[test]
    fn moves_down_by_one_row() {
        let mut square = square_at(0, 0, 4);

        assert!(square.move_down(&empty()));
        assert_eq!(square.cells(), &[14, 15, 24, 25]);
    }

    #[test]
    fn landing_on_floor_locks() {
        let mut square = square_at(0, 18, 4);

        assert!(!square.move_down(&empty()));
        assert!(square.is_locked());
        assert_eq!(square.cells(), &[184, 185, 194, 195]);
    }

    #[test]
    fn landing_on_locked_cell_locks() {
        let mut square = square_at(0, 17, 4);

        assert!(!square.move_down(&locked_at(vec![194])));
        assert!(square.is_locked());
        assert_eq!(square.cells(), &[174, 175, 184, 185]);
    }

    #[test]
    fn falls_until_bottom_row() {
        let mut square = spawn(ShapeKind::O, 0);
        let mut moves = 0;

        while square.move_down(&empty()) {
            moves += 1;
        }

        assert_eq!(moves, 18);
        assert!(square.is_locked());
        assert_eq!(square.cells(), &[183, 184, 193, 194]);
    }

    #[test]
    fn falls_until_resting_on_another_shape() {
        let mut line = spawn(ShapeKind::I, 0);
        let floor = locked_at(vec![125]);

        while line.move_down(&floor) {}

        assert_eq!(line.cells(), &[113, 114, 115, 116]);
    }
}

// ============================================================================
// Rotation Tests
// ============================================================================

mod rotation {
    use super::*;

    fn lowered(kind: ShapeKind, rows: usize) -> Shape {
        let mut shape = spawn(kind, 0);
        for _ in 0..rows {
            assert!(shape.move_down(&empty()));
        }
        shape
    }

    #[test]
    fn square_rotation_is_noop() {
        let mut square = lowered(ShapeKind::O, 5);
        let before = square.clone();

        assert!(!square.rotate(&empty()));
        assert_eq!(square, before);
    }

    #[test]
    fn t_cycles_clockwise() {
        let mut t = lowered(ShapeKind::T, 5);
        assert_eq!(t.cells(), &[53, 54, 55, 64]);

        assert!(t.rotate(&empty()));
        assert_eq!(t.orientation(), Orientation::Left);
        assert_eq!(t.cells(), &[44, 53, 54, 64]);

        assert!(t.rotate(&empty()));
        assert_eq!(t.orientation(), Orientation::Up);
        assert_eq!(t.cells(), &[44, 53, 54, 55]);

        assert!(t.rotate(&empty()));
        assert_eq!(t.orientation(), Orientation::Right);
        assert_eq!(t.cells(), &[44, 54, 55, 64]);

        assert!(t.rotate(&empty()));
        assert_eq!(t.orientation(), Orientation::Down);
        assert_eq!(t.cells(), &[53, 54, 55, 64]);
    }

    #[test]
    fn rotation_is_cyclic_for_every_kind() {
        for kind in ShapeKind::ALL {
            let cycle = kind.orientations().count();
            let mut shape = lowered(kind, 5);
            let start = shape.clone();

            for step in 0..cycle {
                let rotated = shape.rotate(&empty());
                assert_eq!(rotated, cycle > 1, "{kind:?} step {step}");
            }
            assert_eq!(shape, start, "{kind:?}");
        }
    }

    #[test]
    fn line_flips_between_horizontal_and_vertical() {
        let mut line = lowered(ShapeKind::I, 5);
        assert_eq!(line.cells(), &[53, 54, 55, 56]);

        assert!(line.rotate(&empty()));
        assert_eq!(line.orientation(), Orientation::Vertical);
        assert_eq!(line.cells(), &[44, 54, 64, 74]);
    }

    #[test]
    fn s_and_z_are_mirror_images() {
        let mut s = lowered(ShapeKind::S, 5);
        let mut z = lowered(ShapeKind::Z, 5);
        assert_eq!(s.cells(), &[54, 55, 63, 64]);
        assert_eq!(z.cells(), &[53, 54, 64, 65]);

        assert!(s.rotate(&empty()));
        assert!(z.rotate(&empty()));
        assert_eq!(s.cells(), &[43, 53, 54, 64]);
        assert_eq!(z.cells(), &[44, 53, 54, 63]);
    }

    #[test]
    fn l_and_j_turn_through_four_orientations() {
        let mut l = lowered(ShapeKind::L, 5);
        let mut j = lowered(ShapeKind::J, 5);

        let l_orientations: Vec<Orientation> = (0..4)
            .map(|_| {
                assert!(l.rotate(&empty()));
                l.orientation()
            })
            .collect();
        assert_eq!(
            l_orientations,
            vec![Orientation::Left, Orientation::Up, Orientation::Right, Orientation::Down]
        );

        assert!(j.rotate(&empty()));
        assert_eq!(j.cells(), &[44, 54, 63, 64]);
    }

    #[test]
    fn wall_kick_off_left_wall() {
        let mut t = shape(ShapeKind::T, Orientation::Right, vec![40, 50, 51, 60]);

        assert!(t.rotate(&empty()));
        assert_eq!(t.orientation(), Orientation::Down);
        assert_eq!(t.cells(), &[50, 51, 52, 61]);
    }

    #[test]
    fn wall_kick_off_right_wall() {
        let mut t = shape(ShapeKind::T, Orientation::Left, vec![49, 58, 59, 69]);

        assert!(t.rotate(&empty()));
        assert_eq!(t.orientation(), Orientation::Up);
        assert_eq!(t.cells(), &[48, 57, 58, 59]);
    }

    #[test]
    fn line_kicks_one_column_from_near_right_wall() {
        let mut line = shape(ShapeKind::I, Orientation::Vertical, vec![48, 58, 68, 78]);

        assert!(line.rotate(&empty()));
        assert_eq!(line.cells(), &[56, 57, 58, 59]);
    }

    #[test]
    fn at_most_one_kick_per_rotation() {
        // Flat at the right wall the line would need two columns of kick.
        let mut line = shape(ShapeKind::I, Orientation::Vertical, vec![49, 59, 69, 79]);
        let before = line.clone();

        assert!(!line.rotate(&empty()));
        assert_eq!(line, before);
    }

    #[test]
    fn s_and_z_kick_off_right_wall() {
        let mut s = shape(ShapeKind::S, Orientation::Vertical, vec![48, 58, 59, 69]);
        let mut z = shape(ShapeKind::Z, Orientation::Vertical, vec![49, 58, 59, 68]);

        assert!(s.rotate(&empty()));
        assert!(z.rotate(&empty()));

        assert_eq!(s.orientation(), Orientation::Horizontal);
        assert_eq!(s.cells(), &[58, 59, 67, 68]);
        assert_eq!(z.orientation(), Orientation::Horizontal);
        assert_eq!(z.cells(), &[57, 58, 67, 68]);
    }

    #[test]
    fn s_and_z_rotate_flush_against_left_wall() {
        let mut s = shape(ShapeKind::S, Orientation::Horizontal, vec![41, 42, 50, 51]);
        let mut z = shape(ShapeKind::Z, Orientation::Horizontal, vec![40, 41, 51, 52]);

        assert!(s.rotate(&empty()));
        assert!(z.rotate(&empty()));

        assert_eq!(s.cells(), &[30, 40, 41, 51]);
        assert_eq!(z.cells(), &[31, 40, 41, 50]);
    }

    #[test]
    fn l_kicks_off_both_walls() {
        let mut left = shape(ShapeKind::L, Orientation::Right, vec![40, 50, 60, 61]);
        let mut right = shape(ShapeKind::L, Orientation::Left, vec![48, 49, 59, 69]);

        assert!(left.rotate(&empty()));
        assert!(right.rotate(&empty()));

        assert_eq!(left.orientation(), Orientation::Down);
        assert_eq!(left.cells(), &[50, 51, 52, 60]);
        assert_eq!(right.orientation(), Orientation::Up);
        assert_eq!(right.cells(), &[49, 57, 58, 59]);
    }

    #[test]
    fn j_kicks_off_both_walls() {
        let mut left = shape(ShapeKind::J, Orientation::Right, vec![40, 41, 50, 60]);
        let mut right = shape(ShapeKind::J, Orientation::Left, vec![49, 59, 68, 69]);

        assert!(left.rotate(&empty()));
        assert!(right.rotate(&empty()));

        assert_eq!(left.orientation(), Orientation::Down);
        assert_eq!(left.cells(), &[50, 51, 52, 62]);
        assert_eq!(right.orientation(), Orientation::Up);
        assert_eq!(right.cells(), &[47, 57, 58, 59]);
    }

    #[test]
    fn kicked_rotation_still_checks_locked_cells() {
        let mut l = shape(ShapeKind::L, Orientation::Right, vec![40, 50, 60, 61]);
        let before = l.clone();

        assert!(!l.rotate(&locked_at(vec![52])));
        assert_eq!(l, before);
    }

    #[test]
    fn rotation_blocked_by_locked_cell() {
        let mut t = lowered(ShapeKind::T, 5);
        let before = t.clone();

        assert!(!t.rotate(&locked_at(vec![44])));
        assert_eq!(t, before);
    }

    #[test]
    fn rotation_out_of_the_top_is_rejected() {
        let mut line = spawn(ShapeKind::I, 0);
        let before = line.clone();

        assert!(!line.rotate(&empty()));
        assert_eq!(line, before);
    }

    #[test]
    fn rotate_by_steps_counts_accepted_steps() {
        let mut t = lowered(ShapeKind::T, 5);
        let start = t.clone();

        assert_eq!(t.rotate_by_steps(4, &empty()), 4);
        assert_eq!(t, start);

        let mut top = spawn(ShapeKind::I, 0);
        assert_eq!(top.rotate_by_steps(3, &empty()), 0);
    }

    #[test]
    fn partly_cleared_shape_does_not_rotate() {
        let mut t = lowered(ShapeKind::T, 5);
        assert!(t.remove_cell(64));
        assert_eq!(t.cells(), &[53, 55, 64]);

        assert!(!t.rotate(&empty()));
        assert_eq!(t.cells(), &[53, 55, 64]);
    }
}

// ============================================================================
// Cell Removal Tests
// ============================================================================

mod remove_cell {
    use super::*;

    #[test]
    fn part_above_drops_onto_remainder() {
        let mut l = shape(ShapeKind::L, Orientation::Right, vec![44, 54, 64, 65]);

        assert!(l.remove_cell(64));
        assert_eq!(l.cells(), &[54, 64, 65]);
    }

    #[test]
    fn other_columns_stay_put() {
        let mut l = shape(ShapeKind::L, Orientation::Right, vec![44, 54, 64, 65]);

        assert!(l.remove_cell(65));
        assert_eq!(l.cells(), &[44, 54, 64]);
    }

    #[test]
    fn removing_absent_cell_is_noop() {
        let mut l = shape(ShapeKind::L, Orientation::Right, vec![44, 54, 64, 65]);
        let before = l.clone();

        assert!(!l.remove_cell(66));
        assert!(!l.remove_cell(34));
        assert_eq!(l, before);
    }

    #[test]
    fn removing_every_cell_empties_shape() {
        let mut square = square_at(0, 10, 0);
        for cell in [100, 101, 110, 111] {
            square.remove_cell(cell);
        }
        assert!(square.is_empty());
        assert_eq!(square.top_cell(), None);
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
#[should_panic]
fn cells_outside_board_are_rejected() {
    shape(ShapeKind::O, Orientation::Fixed, vec![199, 200]);
}
