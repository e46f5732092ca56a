//! Built-in prompt templates.
//!
//! Templates use `{user_input}` / `{content}` placeholders and ask the
//! model for a single JSON object.

/// Sampling temperature for the refine stage.
pub const REFINE_TEMPERATURE: f32 = 0.8;
/// Sampling temperature for the tag and image stages.
pub const ENRICH_TEMPERATURE: f32 = 0.7;

/// Failure prefix of the refine stage.
pub const REFINE_ERROR_PREFIX: &str = "文案生成失败";
/// Failure prefix of the tag stage.
pub const TAGS_ERROR_PREFIX: &str = "标签生成失败";
/// Failure prefix of the image stage.
pub const IMAGES_ERROR_PREFIX: &str = "配图建议生成失败";

const REFINE_TEMPLATE: &str = r#"你是一个专业的社交文案创作助手，为 Soul App 用户优化帖子内容。

用户原始想法：{user_input}

请生成3个不同风格的版本，每个版本要保留用户的核心意思，但优化表达方式：

1. 轻松版：活泼、有趣，可以适当使用 emoji，适合日常轻松分享
2. 文艺版：有意境、有深度，文字优美，适合情感表达
3. 真实版：口语化、接地气，像朋友间聊天，适合真实记录

要求：
- 每个版本50-80字
- 保持 Soul 平台的温暖、真实调性
- 不要过度矫饰，保留用户的真实感受

请按以下 JSON 格式返回：
{
  "versions": [
    {"style": "轻松版", "content": "...", "description": "活泼有趣，适合日常分享"},
    {"style": "文艺版", "content": "...", "description": "有意境，适合深度表达"},
    {"style": "真实版", "content": "...", "description": "口语化，更真实自然"}
  ]
}
"#;

const TAGS_TEMPLATE: &str = r##"你是一个社交平台标签推荐专家。

基于以下文案，推荐5-7个适合 Soul App 的标签：
{content}

要求：
- 标签要符合年轻人表达习惯
- 包含情绪类、场景类、话题类标签
- 每个标签以 # 开头
- 标签要热门且相关

请按以下 JSON 格式返回：
{
  "tags": ["#标签1", "#标签2", "#标签3", "#标签4", "#标签5"]
}
"##;

const IMAGES_TEMPLATE: &str = r#"你是一个配图建议专家。

基于以下文案，提供2-3个配图建议：
{content}

要求：
- 描述画面内容、色调、氛围
- 适合 AI 绘图或图库搜索
- 符合文案情感基调

请按以下 JSON 格式返回：
{
  "suggestions": [
    {
      "description": "画面描述",
      "keywords": "关键词1、关键词2、关键词3",
      "style": "风格类型（如：小清新、文艺、写实等）"
    }
  ]
}
"#;

/// Renders the refine prompt for `user_input`.
#[must_use]
pub fn refine_prompt(user_input: &str) -> String {
    REFINE_TEMPLATE.replace("{user_input}", user_input)
}

/// Renders the tag prompt for the primary refined `content`.
#[must_use]
pub fn tags_prompt(content: &str) -> String {
    TAGS_TEMPLATE.replace("{content}", content)
}

/// Renders the image prompt for the primary refined `content`.
#[must_use]
pub fn images_prompt(content: &str) -> String {
    IMAGES_TEMPLATE.replace("{content}", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refine_prompt_embeds_input() {
        let prompt = refine_prompt("周末一个人去看海");
        assert!(prompt.contains("用户原始想法：周末一个人去看海"));
        assert!(prompt.contains("\"versions\""));
        assert!(!prompt.contains("{user_input}"));
    }

    #[test]
    fn test_enrich_prompts_embed_content() {
        let tags = tags_prompt("海风很温柔");
        assert!(tags.contains("海风很温柔"));
        assert!(tags.contains("\"tags\""));

        let images = images_prompt("海风很温柔");
        assert!(images.contains("海风很温柔"));
        assert!(images.contains("\"suggestions\""));
        assert!(!images.contains("{content}"));
    }

    #[test]
    fn test_placeholder_in_input_is_not_expanded_twice() {
        let prompt = tags_prompt("{content}");
        assert_eq!(prompt.matches("{content}").count(), 1);
    }
}
