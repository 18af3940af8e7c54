//! Fixed bank of ratio and proportion word problems (Thai)

use super::quiz::Question;
use crate::rng::GameRng;

/// A bank entry: prompt, answer and its four fixed choices
#[derive(Debug, Clone, Copy)]
pub struct RatioProblem {
    pub text: &'static str,
    pub answer: &'static str,
    pub choices: [&'static str; 4],
}

pub const RATIO_PROBLEMS: &[RatioProblem] = &[
    RatioProblem {
        text: "มีแอปเปิ้ล 6 ผล และส้ม 9 ผล อัตราส่วนแอปเปิ้ลต่อส้มเป็นเท่าใด",
        answer: "2 : 3",
        choices: ["2 : 3", "3 : 2", "6 : 15", "1 : 3"],
    },
    RatioProblem {
        text: "ห้องเรียนมีนักเรียนชาย 12 คน หญิง 16 คน อัตราส่วนชายต่อหญิงเป็นเท่าใด",
        answer: "3 : 4",
        choices: ["3 : 4", "4 : 3", "12 : 28", "2 : 3"],
    },
    RatioProblem {
        text: "ถ้า 2 : 5 = x : 20 แล้ว x มีค่าเท่าใด",
        answer: "8",
        choices: ["8", "10", "4", "50"],
    },
    RatioProblem {
        text: "ดินสอ 3 แท่งราคา 15 บาท ดินสอ 7 แท่งราคากี่บาท",
        answer: "35",
        choices: ["35", "21", "45", "30"],
    },
    RatioProblem {
        text: "แผนที่มาตราส่วน 1 : 1000 ระยะบนแผนที่ 5 ซม. คือระยะจริงกี่เมตร",
        answer: "50",
        choices: ["50", "500", "5", "5000"],
    },
    RatioProblem {
        text: "ผสมน้ำหวานกับน้ำในอัตราส่วน 1 : 4 ถ้าใช้น้ำ 200 มล. ต้องใช้น้ำหวานกี่มล.",
        answer: "50",
        choices: ["50", "40", "800", "25"],
    },
    RatioProblem {
        text: "อัตราส่วน 18 : 24 เขียนเป็นอัตราส่วนอย่างต่ำได้อย่างไร",
        answer: "3 : 4",
        choices: ["3 : 4", "9 : 12", "6 : 8", "4 : 3"],
    },
    RatioProblem {
        text: "รถวิ่งได้ 120 กม. ใน 2 ชั่วโมง ใน 5 ชั่วโมงจะวิ่งได้กี่กม.",
        answer: "300",
        choices: ["300", "240", "250", "600"],
    },
    RatioProblem {
        text: "แบ่งเงิน 60 บาทให้ A และ B ในอัตราส่วน 1 : 2 B ได้กี่บาท",
        answer: "40",
        choices: ["40", "20", "30", "45"],
    },
    RatioProblem {
        text: "ถ้า a : b = 3 : 5 และ b = 25 แล้ว a มีค่าเท่าใด",
        answer: "15",
        choices: ["15", "5", "20", "75"],
    },
];

/// Draw one problem uniformly and shuffle its choices
pub fn draw(rng: &mut GameRng) -> Question<String> {
    let problem = rng
        .pick(RATIO_PROBLEMS)
        .copied()
        .unwrap_or(RATIO_PROBLEMS[0]);
    let mut choices: Vec<String> = problem.choices.iter().map(|c| c.to_string()).collect();
    rng.shuffle(&mut choices);
    Question {
        text: problem.text.to_string(),
        choices,
        correct: problem.answer.to_string(),
        operation: None,
    }
}
