// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
use exam_bank_syntax::StyledRun;

#[allow(dead_code)]
pub fn generate_exam(questions: usize) -> Vec<StyledRun> {
    let mut runs = Vec::with_capacity(questions * 3);
    for i in 0..questions {
        match i % 3 {
            0 => {
                runs.push(StyledRun::plain(format!(
                    "(CLO{}) Question {i}: evaluate $x^{i}$ at $x = 2$.\nA. 1\nB. ",
                    i % 5 + 1
                )));
                runs.push(StyledRun::emphasized(format!("{}", 1u64 << (i % 20))));
                runs.push(StyledRun::plain("\nC. 0\nD. none of these\n\n"));
            }
            1 => {
                runs.push(StyledRun::plain(
                    "[<sg>](CLO2) Listen and answer (<1>) and (<2>).\n[audio: ./audio/track.mp3]\n[<egc>]\n(<1>) Who speaks?\nA. ",
                ));
                runs.push(StyledRun::emphasized("Anna"));
                runs.push(StyledRun::plain("\nB. Ben\n(<2>) Where?\nA. Home\nB. "));
                runs.push(StyledRun::emphasized("School"));
                runs.push(StyledRun::plain("\n[</sg>]\n"));
            }
            _ => {
                runs.push(StyledRun::plain(
                    "[<sg>]The cat {<1>}_____ on the mat and {<2>}_____ all day.[<egc>]\n{<1>}\nA. ",
                ));
                runs.push(StyledRun::emphasized("sat"));
                runs.push(StyledRun::plain("\nB. sit\n{<2>}\nA. "));
                runs.push(StyledRun::emphasized("slept"));
                runs.push(StyledRun::plain("\nB. sleeps\n[</sg>]\n"));
            }
        }
    }
    runs
}
