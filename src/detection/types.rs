// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测框与非极大值抑制
//! Bounding boxes and non-max suppression

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bbox {
    // a bounding box around an object
    xmin: f32,
    ymin: f32,
    width: f32,
    height: f32,
    id: usize,
    confidence: f32,
}

impl Bbox {
    pub fn new(xmin: f32, ymin: f32, width: f32, height: f32, id: usize, confidence: f32) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
            id,
            confidence,
        }
    }

    /// 由归一化中心坐标构造 (Darknet输出格式)
    pub fn from_normalized_cxcywh(
        cx: f32,
        cy: f32,
        w: f32,
        h: f32,
        frame_width: u32,
        frame_height: u32,
        id: usize,
        confidence: f32,
    ) -> Self {
        let width = (w * frame_width as f32).trunc();
        let height = (h * frame_height as f32).trunc();
        let center_x = (cx * frame_width as f32).trunc();
        let center_y = (cy * frame_height as f32).trunc();
        Self::new(
            (center_x - (width / 2.).trunc()).trunc(),
            (center_y - (height / 2.).trunc()).trunc(),
            width,
            height,
            id,
            confidence,
        )
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn xmin(&self) -> f32 {
        self.xmin
    }

    pub fn ymin(&self) -> f32 {
        self.ymin
    }

    pub fn xmax(&self) -> f32 {
        self.xmin + self.width
    }

    pub fn ymax(&self) -> f32 {
        self.ymin + self.height
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn intersection_area(&self, another: &Bbox) -> f32 {
        let l = self.xmin.max(another.xmin);
        let r = self.xmax().min(another.xmax());
        let t = self.ymin.max(another.ymin);
        let b = self.ymax().min(another.ymax());
        (r - l).max(0.) * (b - t).max(0.)
    }

    pub fn union(&self, another: &Bbox) -> f32 {
        self.area() + another.area() - self.intersection_area(another)
    }

    pub fn iou(&self, another: &Bbox) -> f32 {
        let union = self.union(another);
        if union <= 0. {
            return 0.;
        }
        self.intersection_area(another) / union
    }
}

/// 按置信度降序保留框, 与已保留框IoU超过阈值的框被丢弃
pub fn non_max_suppression(xs: &mut Vec<Bbox>, iou_threshold: f32) {
    xs.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));

    let mut current_index = 0;
    for index in 0..xs.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = xs[prev_index].iou(&xs[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            xs.swap(current_index, index);
            current_index += 1;
        }
    }
    xs.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical_and_disjoint() {
        let a = Bbox::new(0., 0., 10., 10., 0, 0.9);
        let b = Bbox::new(20., 20., 10., 10., 0, 0.8);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        let a = Bbox::new(0., 0., 10., 10., 0, 0.9);
        let b = Bbox::new(5., 0., 10., 10., 0, 0.8);
        // 交集50, 并集150
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_normalized_center() {
        let b = Bbox::from_normalized_cxcywh(0.5, 0.5, 0.25, 0.5, 400, 200, 3, 0.7);
        assert_eq!(b.xmin(), 150.);
        assert_eq!(b.ymin(), 50.);
        assert_eq!(b.width(), 100.);
        assert_eq!(b.height(), 100.);
        assert_eq!(b.id(), 3);
    }

    #[test]
    fn test_nms_keeps_highest_confidence() {
        let mut xs = vec![
            Bbox::new(0., 0., 10., 10., 0, 0.6),
            Bbox::new(1., 1., 10., 10., 0, 0.9),
            Bbox::new(50., 50., 10., 10., 1, 0.5),
        ];
        non_max_suppression(&mut xs, 0.4);
        assert_eq!(xs.len(), 2);
        assert_eq!(xs[0].confidence(), 0.9);
        assert_eq!(xs[1].confidence(), 0.5);
    }

    #[test]
    fn test_nms_empty() {
        let mut xs: Vec<Bbox> = Vec::new();
        non_max_suppression(&mut xs, 0.4);
        assert!(xs.is_empty());
    }
}
