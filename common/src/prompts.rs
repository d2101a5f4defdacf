//! Prompt templates
//!
//! - SINGLE_ANALYSIS_PROMPT: scores one image
//! - build_comparison_prompt: ranks N images in one joint call
//!
//! The grade labels are Korean because the JSON contract expects them;
//! `RustGrade::from_label` maps them back.

/// Grade labels the model must choose from, mildest first.
pub const GRADE_LABELS: &[&str] = &["정상", "경미", "보통", "심각"];

/// Prompt for scoring a single image
pub const SINGLE_ANALYSIS_PROMPT: &str = r#"당신은 금속 부식/녹 감별 전문가입니다. 철 막대의 녹 정도를 분석해주세요.

## 분석 대상
- 얇고 기다란 철 막대 (쇠)
- 코팅이 있거나 없을 수 있음
- 녹(rust)의 정도를 판별

## 평가 기준 (각 항목 0-100점, 점수가 높을수록 녹이 심함)

### 1. 색상 변화 점수 (40% 비중)
- 90-100: 전체가 짙은 갈색/적갈색 녹으로 덮임
- 70-89: 대부분 녹 색상, 원래 금속색 거의 안 보임
- 50-69: 녹 색상이 상당 부분 차지
- 30-49: 부분적 녹 색상, 원래 색상 많이 보임
- 10-29: 약간의 변색만 있음
- 0-9: 녹 색상 거의 없음, 깨끗한 금속색

### 2. 녹 범위 점수 (35% 비중)
- 90-100: 표면 90% 이상 녹
- 70-89: 표면 60-90% 녹
- 50-69: 표면 30-60% 녹
- 30-49: 표면 10-30% 녹
- 10-29: 표면 5-10% 녹
- 0-9: 표면 5% 미만 녹

### 3. 부식 상태 점수 (25% 비중)
- 90-100: 심한 부식, 표면 손상, 구멍/박리 있음
- 70-89: 상당한 부식, 표면 거칠어짐
- 50-69: 중간 부식, 질감 변화 있음
- 30-49: 경미한 부식, 약간의 질감 변화
- 10-29: 매우 경미한 표면 변화
- 0-9: 부식 없음, 매끈한 표면

## 녹 등급 기준 (총점 기준) - 반드시 4단계만 사용
- **심각** (rust_percentage: 70~100%): 총점 75점 이상
- **보통** (rust_percentage: 30~70%): 총점 50-74점
- **경미** (rust_percentage: 10~30%): 총점 25-49점
- **정상** (rust_percentage: 0~10%): 총점 25점 미만

## 응답 형식 (JSON만 출력)
```json
{
  "is_metal_rod": true,
  "color_score": 0-100,
  "coverage_score": 0-100,
  "corrosion_score": 0-100,
  "rust_score": 0-100,
  "rust_grade": "정상" 또는 "경미" 또는 "보통" 또는 "심각",
  "rust_percentage_min": 숫자,
  "rust_percentage_max": 숫자,
  "confidence_score": 0-100,
  "color_analysis": "색상 분석 (구체적 근거)",
  "surface_analysis": "표면 상태 분석 (구체적 근거)",
  "corrosion_analysis": "부식 정도 분석 (구체적 근거)",
  "analysis_reason": "종합 판단 (왜 이 등급인지)"
}
```

**중요**:
- rust_grade는 반드시 "정상", "경미", "보통", "심각" 중 하나만 사용하세요.
- 다른 표현 절대 금지!
- 철 막대가 아니면 is_metal_rod: false로 응답
- 코팅이 벗겨진 부분도 녹으로 간주할 수 있음

이미지를 분석해주세요."#;

/// Build the joint comparison prompt for `count` images.
///
/// # Arguments
/// * `count` - number of images sent in the same request
///
/// # Returns
/// Prompt asking for a tie-free ranking, 1 = most rusted
pub fn build_comparison_prompt(count: usize) -> String {
    format!(
        r#"당신은 금속 부식/녹 감별 전문가입니다.
{count}장의 철 막대 이미지를 비교하여 녹이 심한 순서대로 순위를 매겨주세요.

## 비교 기준
1. **색상 변화**: 갈색/적갈색 녹 색상이 많을수록 녹이 심함
2. **녹 범위**: 표면에서 녹이 차지하는 비율
3. **부식 정도**: 표면 손상, 질감 변화 정도

## 중요 지침
- 이미지 간 **상대적 차이**를 반드시 구분하세요
- 아무리 비슷해 보여도 미세한 차이를 찾아 순위를 명확히 매기세요
- 동점 없이 1위(가장 녹이 심함)부터 {count}위(가장 깨끗함)까지 모두 다른 순위를 부여하세요
- 각 이미지의 rust_score는 최소 5점 이상 차이나게 해주세요

## 녹 등급 기준 - 반드시 4단계만 사용
- **심각** (70~100%): 총점 75점 이상
- **보통** (30~70%): 총점 50-74점
- **경미** (10~30%): 총점 25-49점
- **정상** (0~10%): 총점 25점 미만

## 응답 형식 (JSON 배열로 출력, 녹이 심한 순)
```json
[
  {{
    "image_index": 1,
    "rank": 1,
    "rust_score": 85,
    "rust_grade": "심각",
    "rust_percentage_min": 70,
    "rust_percentage_max": 100,
    "confidence_score": 85,
    "color_analysis": "색상 분석",
    "surface_analysis": "표면 분석",
    "corrosion_analysis": "부식 분석",
    "analysis_reason": "왜 이 순위인지 다른 이미지와 비교하여 설명",
    "comparison_note": "다른 이미지 대비 어떤 점이 더 녹이 심한지/덜한지"
  }},
  ...
]
```

**중요**: rust_grade는 반드시 "정상", "경미", "보통", "심각" 중 하나만 사용!

{count}장의 이미지를 순서대로 분석하고, 녹이 심한 순으로 순위를 매겨주세요.
첫 번째 이미지가 image_index: 1, 두 번째가 image_index: 2 입니다."#
    )
}

/// Text label sent before the `index`-th (1-based) image of a joint call.
pub fn image_label(index: usize) -> String {
    format!("[이미지 {}]", index)
}
