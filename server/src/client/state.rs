//! Viewer state: the two images shown side by side and the rating panel

use super::service::{ClientError, GatewayClient};
use crate::segmentation::split_data_url;

/// Display state for one upload/segment/rate cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    pub original_image_base64: String,
    pub segmented_image_base64: String,
    /// `data:<mime>;base64,` header of the uploaded file
    pub base64_prefix: String,
    pub show_rating_component: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            original_image_base64: String::new(),
            segmented_image_base64: String::new(),
            base64_prefix: String::new(),
            show_rating_component: true,
        }
    }
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_original_image_base64(&mut self, base64: impl Into<String>) {
        self.original_image_base64 = base64.into();
    }

    pub fn set_segmented_image_base64(&mut self, base64: impl Into<String>) {
        self.segmented_image_base64 = base64.into();
    }

    pub fn set_base64_prefix(&mut self, prefix: impl Into<String>) {
        self.base64_prefix = prefix.into();
    }

    pub fn set_show_rating_component(&mut self, show: bool) {
        self.show_rating_component = show;
    }

    /// Load a freshly uploaded image given as a data URL or bare base64.
    ///
    /// Clears the previous result and shows the rating panel again.
    pub fn load_data_url(&mut self, data_url: &str) {
        let (prefix, payload) = split_data_url(data_url);
        self.set_base64_prefix(prefix);
        self.set_original_image_base64(payload);
        self.segmented_image_base64.clear();
        self.show_rating_component = true;
    }

    pub fn has_result(&self) -> bool {
        !self.segmented_image_base64.is_empty()
    }

    /// Original image as a displayable data URL
    pub fn original_data_url(&self) -> Option<String> {
        if self.original_image_base64.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.base64_prefix, self.original_image_base64))
    }

    /// Segmented image as a displayable data URL, using the upload's prefix
    pub fn segmented_data_url(&self) -> Option<String> {
        if !self.has_result() {
            return None;
        }
        Some(format!("{}{}", self.base64_prefix, self.segmented_image_base64))
    }

    /// Send the original image for segmentation and keep the result
    pub async fn submit(&mut self, client: &GatewayClient) -> Result<(), ClientError> {
        let segmented = client.post_mammogram(&self.original_image_base64).await?;
        self.set_segmented_image_base64(segmented);
        self.show_rating_component = true;
        Ok(())
    }

    /// Rate the current result; the rating panel is hidden once accepted
    pub async fn rate(&mut self, client: &GatewayClient, is_good: bool) -> Result<(), ClientError> {
        client.post_rating(is_good).await?;
        self.show_rating_component = false;
        Ok(())
    }
}
