#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use std::{
    env::args,
    io::{self, Write, stdin, stdout},
};

use arbiter::{fuzz::fuzz, game::Game, moves::Move, square::Square};
use rand::{SeedableRng, rngs::SmallRng};

fn main() {
    let args: Vec<String> = args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            if let Err(err) = repl() {
                eprintln!("Error: {err}");
            }
        }
        Some("fuzz") => {
            let plies = match args.get(1).map(|plies| plies.parse()).transpose() {
                Ok(plies) => plies,
                Err(err) => {
                    eprintln!("Error: invalid ply count: {err}");
                    return;
                }
            };
            let mut rng = match args.get(2).map(|seed| seed.parse()).transpose() {
                Ok(Some(seed)) => SmallRng::seed_from_u64(seed),
                Ok(None) => SmallRng::from_os_rng(),
                Err(err) => {
                    eprintln!("Error: invalid seed: {err}");
                    return;
                }
            };
            fuzz(plies, &mut rng);
            println!("no disagreement found");
        }
        Some(mode) => eprintln!("Error: unknown mode `{mode}`, expected `fuzz` or nothing"),
    }
}

fn help() {
    println!("reset               - reset to starting position");
    println!("import <position>   - load a position description");
    println!("fen <fen>           - load a FEN position");
    println!("export              - print the position description and FEN");
    println!("moves               - list legal moves");
    println!("history [n]         - print the last n moves, or all of them");
    println!("undo                - take back the last move");
    println!("quit                - exit the game");
    println!("e2                  - view legal moves of a piece");
    println!("e2-e4               - play the move");
    println!("e7Qe8               - move and promote");
    println!("e1-h1 (or e1-g1)    - perform castling");
}

fn repl() -> io::Result<()> {
    let mut game = Game::new();
    let mut info = String::from("type `help` for instructions\n");
    let mut update = true;
    loop {
        if update {
            let result = game.result();
            if result.is_over() {
                info.push_str(&format!("{result}\n"));
            } else {
                info.push_str(&format!("{} plays\n", game.current_player()));
            }
            println!("{}", game.board());
            print!("{info}");
            info.clear();
            update = false;
        }
        print!("> ");
        stdout().flush()?;
        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }
        let input = input.trim();
        let (command, argument) = input
            .split_once(' ')
            .map_or((input, ""), |(command, argument)| (command, argument.trim()));
        match command {
            "" => (),
            "help" => help(),
            "quit" | "exit" => return Ok(()),
            "reset" => {
                game = Game::new();
                update = true;
            }
            "undo" => {
                if game.history().next().is_none() {
                    eprintln!("Error: no move to undo");
                } else {
                    println!("took back {}", game.undo());
                    update = true;
                }
            }
            "moves" => {
                let moves: Vec<_> = game.legal_moves().iter().map(Move::to_string).collect();
                println!("{}", moves.join(" "));
            }
            "history" => {
                let last = match (!argument.is_empty()).then(|| argument.parse()).transpose() {
                    Ok(last) => last,
                    Err(err) => {
                        eprintln!("Error: {err}");
                        continue;
                    }
                };
                println!("{}", game.history_as_move_string(last));
            }
            "export" => {
                println!("{}", game.description());
                println!("{}", game.fen());
            }
            "import" => match Game::from_description(argument) {
                Ok(imported) => {
                    game = imported;
                    update = true;
                }
                Err(err) => eprintln!("Error: {err}"),
            },
            "fen" => match Game::from_fen(argument) {
                Ok(imported) => {
                    game = imported;
                    update = true;
                }
                Err(err) => eprintln!("Error: {err}"),
            },
            _ => {
                if let Ok(square) = input.parse::<Square>() {
                    let destinations: Vec<_> = game
                        .legal_moves_from(square)
                        .iter()
                        .map(|movement| movement.to.to_string())
                        .collect();
                    if destinations.is_empty() {
                        println!("{square} has no legal move");
                    } else {
                        println!("{}", destinations.join(" "));
                    }
                    continue;
                }
                let movement = match game.parse_move(input) {
                    Ok(movement) => movement,
                    Err(err) => {
                        eprintln!("Error: {err}");
                        continue;
                    }
                };
                if !game.is_selectable(movement.from) {
                    eprintln!("Error: {} has no piece that can move", movement.from);
                    continue;
                }
                if let Err(err) = game.apply(movement) {
                    eprintln!("Error: {err}");
                    continue;
                }
                update = true;
            }
        }
    }
}
