//! 服务器应答的强类型视图
//!
//! 线上形状（`[f64; 7]`、按行的 `Vec<Vec<f64>>` 等）在这里转换为
//! `nalgebra` 类型。只检查形状，不检查数值语义。

use crate::error::RobotError;
use hpp_service::{DistanceReply, Placement};
use nalgebra::{DMatrix, Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};

/// 线上位姿 `(x, y, z, qw, qx, qy, qz)` 转换为刚体变换
pub fn placement_to_isometry(placement: &Placement) -> Result<Isometry3<f64>, RobotError> {
    let [x, y, z, qw, qx, qy, qz] = *placement;
    let quaternion = Quaternion::new(qw, qx, qy, qz);
    let norm = quaternion.norm();
    if norm.is_nan() || norm <= 0.0 {
        return Err(RobotError::MalformedReply(format!(
            "joint placement has a degenerate rotation: {placement:?}"
        )));
    }
    Ok(Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_quaternion(quaternion),
    ))
}

/// 三个分量的向量
pub fn vector3_from_reply(values: &[f64], what: &str) -> Result<Vector3<f64>, RobotError> {
    match values {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(RobotError::MalformedReply(format!(
            "{what} has {} components, expected 3",
            values.len()
        ))),
    }
}

/// 按行给出的矩阵，所有行必须等长
pub fn matrix_from_rows(rows: &[Vec<f64>], what: &str) -> Result<DMatrix<f64>, RobotError> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(RobotError::MalformedReply(format!(
            "{what}: row {i} has {} columns, expected {ncols}",
            row.len()
        )));
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

/// 距离查询结果
///
/// 五个序列按碰撞对下标对齐，长度保证相同。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistancesToCollision {
    pub distances: Vec<f64>,
    /// 属于刚体的对象
    pub inner_objects: Vec<String>,
    /// 与内部对象一起测试的对象（也可能是另一个刚体的内部对象）
    pub outer_objects: Vec<String>,
    /// 刚体上的最近点
    pub inner_points: Vec<Point3<f64>>,
    /// 障碍物上的最近点
    pub outer_points: Vec<Point3<f64>>,
}

/// 单个碰撞对
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair<'a> {
    pub distance: f64,
    pub inner_object: &'a str,
    pub outer_object: &'a str,
    pub inner_point: Point3<f64>,
    pub outer_point: Point3<f64>,
}

impl DistancesToCollision {
    /// 碰撞对数量
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = CollisionPair<'_>> {
        (0..self.len()).map(move |i| CollisionPair {
            distance: self.distances[i],
            inner_object: &self.inner_objects[i],
            outer_object: &self.outer_objects[i],
            inner_point: self.inner_points[i],
            outer_point: self.outer_points[i],
        })
    }

    /// 距离最小的碰撞对
    pub fn closest(&self) -> Option<CollisionPair<'_>> {
        self.pairs().min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl TryFrom<DistanceReply> for DistancesToCollision {
    type Error = RobotError;

    fn try_from(reply: DistanceReply) -> Result<Self, Self::Error> {
        let n = reply.distances.len();
        let lengths = [
            ("inner objects", reply.inner_objects.len()),
            ("outer objects", reply.outer_objects.len()),
            ("inner points", reply.inner_points.len()),
            ("outer points", reply.outer_points.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n) {
            return Err(RobotError::MalformedReply(format!(
                "distances to collision: {n} distances but {len} {name}"
            )));
        }

        let to_points =
            |points: Vec<[f64; 3]>| points.into_iter().map(Point3::from).collect::<Vec<_>>();
        Ok(Self {
            distances: reply.distances,
            inner_objects: reply.inner_objects,
            outer_objects: reply.outer_objects,
            inner_points: to_points(reply.inner_points),
            outer_points: to_points(reply.outer_points),
        })
    }
}
